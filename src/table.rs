use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// One dataset sample as produced by the inference pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    pub entity_id: String,
    pub frame_id: f64,
    pub y_true: f64,
    pub y_pred_raw: f64,
    pub weight: f64,
}

/// Per-sample row after calibration. Field order and serde names are the
/// column contract of the persisted result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratedRow {
    #[serde(rename = "pdbid")]
    pub entity_id: String,
    #[serde(rename = "frame")]
    pub frame_id: f64,
    pub y_true: f64,
    pub y_pred: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedEntity {
    pub entity_id: String,
    pub y_true: f64,
    pub y_pred_agg: f64,
}

/// Column-wise accumulation of a full dataset pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionTable {
    pub entity_ids: Vec<String>,
    pub frames: Vec<f64>,
    pub y_true: Vec<f64>,
    pub y_pred_raw: Vec<f64>,
    pub weights: Vec<f64>,
}

impl PredictionTable {
    pub fn len(&self) -> usize {
        self.entity_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_ids.is_empty()
    }

    /// Every column must have as many entries as there are entity ids.
    pub fn validate(&self) -> Result<()> {
        let n = self.entity_ids.len();
        let columns = [
            ("frame", self.frames.len()),
            ("y_true", self.y_true.len()),
            ("y_pred", self.y_pred_raw.len()),
            ("weight", self.weights.len()),
        ];
        for (name, len) in columns {
            if len != n {
                return Err(EvalError::shape(format!("prediction table column {name}"), n, len));
            }
        }
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = PredictionRow> + '_ {
        (0..self.len()).map(|i| PredictionRow {
            entity_id: self.entity_ids[i].clone(),
            frame_id: self.frames[i],
            y_true: self.y_true[i],
            y_pred_raw: self.y_pred_raw[i],
            weight: self.weights[i],
        })
    }
}

pub fn split_aligned(entities: &[AggregatedEntity]) -> (Vec<f64>, Vec<f64>) {
    let mut y_true = Vec::with_capacity(entities.len());
    let mut y_pred = Vec::with_capacity(entities.len());
    for e in entities {
        y_true.push(e.y_true);
        y_pred.push(e.y_pred_agg);
    }
    (y_true, y_pred)
}

#[cfg(test)]
#[path = "../tests/src_inline/table.rs"]
mod tests;
