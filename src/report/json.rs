use serde_json::{Map, Value, json};

use crate::pipeline::driver::{CheckpointOutcome, EvaluationSummary, RescoreOutcome};
use crate::report::MetricReport;

/// Non-finite values render as `null`.
pub fn metrics_json(report: &MetricReport) -> Value {
    let mut map = Map::new();
    for (m, v) in &report.values {
        map.insert(m.name().to_string(), json!(v));
    }
    Value::Object(map)
}

pub fn outcomes_json(outcomes: &[CheckpointOutcome]) -> Value {
    let checkpoints: Vec<Value> = outcomes
        .iter()
        .map(|outcome| match outcome {
            CheckpointOutcome::Evaluated(e) => json!({
                "checkpoint": e.checkpoint.path.display().to_string(),
                "epoch": e.checkpoint.epoch.as_str(),
                "state": outcome.state(),
                "results": e.result_path.display().to_string(),
                "n_samples": e.n_samples,
                "n_entities": e.n_entities,
                "metrics": metrics_json(&e.report),
            }),
            CheckpointOutcome::Failed(f) => json!({
                "checkpoint": f.checkpoint.path.display().to_string(),
                "epoch": f.checkpoint.epoch.as_str(),
                "state": outcome.state(),
                "failed_in": f.state,
                "error_kind": f.error.kind(),
                "error": f.error.to_string(),
            }),
        })
        .collect();
    json!({
        "summary": EvaluationSummary::from_outcomes(outcomes),
        "checkpoints": checkpoints,
    })
}

pub fn rescore_json(outcome: &RescoreOutcome) -> Value {
    json!({
        "table": outcome.table.display().to_string(),
        "n_samples": outcome.n_samples,
        "n_entities": outcome.n_entities,
        "n_points": outcome.report.n_points,
        "metrics": metrics_json(&outcome.report),
    })
}
