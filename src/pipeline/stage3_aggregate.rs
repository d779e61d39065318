use std::collections::{HashMap, HashSet};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::table::{AggregatedEntity, CalibratedRow};

/// Collapses the frames of one entity into a single score.
pub trait FrameReduction {
    fn reduce(&self, frames: &[&CalibratedRow]) -> f64;
}

impl<F> FrameReduction for F
where
    F: Fn(&[&CalibratedRow]) -> f64,
{
    fn reduce(&self, frames: &[&CalibratedRow]) -> f64 {
        self(frames)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Reduction {
    #[default]
    Mean,
    Median,
    WeightedMean,
}

impl FrameReduction for Reduction {
    fn reduce(&self, frames: &[&CalibratedRow]) -> f64 {
        match self {
            Reduction::Mean => mean_frame(frames),
            Reduction::Median => median_frame(frames),
            Reduction::WeightedMean => weighted_mean_frame(frames),
        }
    }
}

pub fn mean_frame(frames: &[&CalibratedRow]) -> f64 {
    let sum: f64 = frames.iter().map(|r| r.y_pred).sum();
    sum / frames.len() as f64
}

pub fn median_frame(frames: &[&CalibratedRow]) -> f64 {
    let mut values: Vec<f64> = frames.iter().map(|r| r.y_pred).collect();
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Weight-averaged prediction; NaN when the weights sum to zero.
pub fn weighted_mean_frame(frames: &[&CalibratedRow]) -> f64 {
    let mut num = 0.0;
    let mut den = 0.0;
    for r in frames {
        num += r.weight * r.y_pred;
        den += r.weight;
    }
    if den == 0.0 { f64::NAN } else { num / den }
}

/// Default validity filter: negative aggregates mark an invalid entity.
pub fn non_negative(value: f64) -> bool {
    value >= 0.0 || value.is_nan()
}

/// Distinct ground-truth values across the frames of one entity, in order of
/// first appearance. Values compare bitwise so NaN matches NaN.
pub fn distinct_truths(frames: &[&CalibratedRow]) -> Vec<f64> {
    let mut values: Vec<f64> = Vec::new();
    for r in frames {
        if !values.iter().any(|v| v.total_cmp(&r.y_true).is_eq()) {
            values.push(r.y_true);
        }
    }
    values
}

/// Entity ids in order of first appearance in `rows`.
pub fn first_seen_order(rows: &[CalibratedRow]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for row in rows {
        if seen.insert(row.entity_id.as_str()) {
            order.push(row.entity_id.as_str());
        }
    }
    order
}

pub fn aggregate<S, R>(rows: &[CalibratedRow], entity_ids: &[S], reduce: &R) -> Vec<AggregatedEntity>
where
    S: AsRef<str>,
    R: FrameReduction + ?Sized,
{
    aggregate_with(rows, entity_ids, reduce, non_negative)
}

/// Groups `rows` by entity, reduces each group visited in `entity_ids` order,
/// drops entities rejected by `keep`, and sorts the survivors by ascending
/// ground truth. Ids without rows are skipped. An entity whose frames disagree
/// on the ground truth keeps the first row's value and is logged.
pub fn aggregate_with<S, R, K>(
    rows: &[CalibratedRow],
    entity_ids: &[S],
    reduce: &R,
    keep: K,
) -> Vec<AggregatedEntity>
where
    S: AsRef<str>,
    R: FrameReduction + ?Sized,
    K: Fn(f64) -> bool,
{
    let mut groups: HashMap<&str, Vec<&CalibratedRow>> = HashMap::new();
    for row in rows {
        groups.entry(row.entity_id.as_str()).or_default().push(row);
    }

    let mut visited = HashSet::new();
    let mut out = Vec::with_capacity(groups.len());
    let mut dropped = 0usize;
    let mut missing = 0usize;
    let mut conflicting = 0usize;
    for id in entity_ids {
        let id = id.as_ref();
        if !visited.insert(id) {
            continue;
        }
        let Some(group) = groups.get(id) else {
            missing += 1;
            continue;
        };
        let truths = distinct_truths(group);
        if truths.len() > 1 {
            conflicting += 1;
            warn!(entity = id, values = ?truths, "frames disagree on ground truth, keeping the first");
        }
        let value = reduce.reduce(group);
        if !keep(value) {
            dropped += 1;
            continue;
        }
        out.push(AggregatedEntity {
            entity_id: id.to_string(),
            y_true: group[0].y_true,
            y_pred_agg: value,
        });
    }

    out.sort_by(|a, b| a.y_true.total_cmp(&b.y_true));
    debug!(
        "aggregated {} entities ({} filtered, {} without rows, {} with conflicting truth)",
        out.len(),
        dropped,
        missing,
        conflicting
    );
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_aggregate.rs"]
mod tests;
