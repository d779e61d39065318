use super::json::{metrics_json, outcomes_json, rescore_json};
use super::text::{render_outcomes_text, render_rescore_text};
use super::*;
use crate::checkpoint::{CheckpointRecord, EpochKey};
use crate::error::EvalError;
use crate::pipeline::driver::{
    CheckpointEvaluation, CheckpointFailure, CheckpointOutcome, EvalState, RescoreOutcome,
};
use std::path::PathBuf;

fn report() -> MetricReport {
    MetricReport {
        n_points: 2,
        values: Metric::ALL
            .iter()
            .enumerate()
            .map(|(i, &m)| (m, i as f64 * 0.5))
            .collect(),
    }
}

fn outcomes() -> Vec<CheckpointOutcome> {
    vec![
        CheckpointOutcome::Evaluated(CheckpointEvaluation {
            checkpoint: CheckpointRecord {
                epoch: EpochKey::new("9"),
                path: PathBuf::from("/runs/checkpoint9.pt"),
            },
            result_path: PathBuf::from("/runs/checkpoint9_t.csv"),
            n_samples: 40,
            n_entities: 10,
            report: report(),
        }),
        CheckpointOutcome::Failed(CheckpointFailure {
            checkpoint: CheckpointRecord {
                epoch: EpochKey::new("8"),
                path: PathBuf::from("/runs/checkpoint8.pt"),
            },
            state: EvalState::Loading,
            error: EvalError::Checkpoint {
                path: PathBuf::from("/runs/checkpoint8.pt"),
                reason: "truncated file".to_string(),
            },
        }),
    ]
}

#[test]
fn test_lines_one_per_metric() {
    let lines = report().lines();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "pearson_r: 0.000000");
    assert_eq!(lines[5], "smape: 2.500000");
}

#[test]
fn test_nan_formatting() {
    assert_eq!(format_f64_6(f64::NAN), "nan");
    assert_eq!(format_f64_6(f64::NEG_INFINITY), "-inf");
    assert_eq!(format_f64_6(0.1234567), "0.123457");
}

#[test]
fn test_get_metric() {
    let r = report();
    assert_eq!(r.get(Metric::Mae), Some(1.0));
}

#[test]
fn test_outcomes_text() {
    let text = render_outcomes_text(&outcomes());
    assert!(text.contains("checkpoint9.pt (epoch 9): 40 samples, 10 entities"));
    assert!(text.contains("  r2: 0.500000"));
    assert!(text.contains("checkpoint8.pt (epoch 8): FAILED while Loading"));
    assert!(text.contains("truncated file"));
    assert!(text.ends_with("Evaluated: 1\nFailed: 1\n"));
}

#[test]
fn test_outcomes_json() {
    let v = outcomes_json(&outcomes());
    assert_eq!(v["summary"]["evaluated"], 1);
    assert_eq!(v["summary"]["failed"], 1);
    assert_eq!(v["checkpoints"][0]["state"], "done");
    assert_eq!(v["checkpoints"][0]["metrics"]["mse"], 1.5);
    assert_eq!(v["checkpoints"][1]["failed_in"], "loading");
    assert_eq!(v["checkpoints"][1]["error_kind"], "checkpoint");
}

#[test]
fn test_nan_metric_is_null_in_json() {
    let mut r = report();
    r.values[0].1 = f64::NAN;
    let v = metrics_json(&r);
    assert!(v["pearson_r"].is_null());
}

#[test]
fn test_rescore_renderers() {
    let outcome = RescoreOutcome {
        table: PathBuf::from("checkpoint3_t.csv"),
        n_samples: 12,
        n_entities: 4,
        report: report(),
    };
    let text = render_rescore_text(&outcome);
    assert!(text.starts_with("checkpoint3_t.csv: 12 samples, 4 entities\n"));
    assert!(text.contains("mae: 1.000000\n"));
    let v = rescore_json(&outcome);
    assert_eq!(v["n_points"], 2);
    assert_eq!(v["metrics"]["r2"], 0.5);
}
