use crate::pipeline::driver::{CheckpointOutcome, EvaluationSummary, RescoreOutcome};

pub fn render_outcomes_text(outcomes: &[CheckpointOutcome]) -> String {
    let mut out = String::new();
    out.push_str("Checkpoint Evaluation Report\n");
    out.push_str("============================\n\n");

    for outcome in outcomes {
        match outcome {
            CheckpointOutcome::Evaluated(e) => {
                out.push_str(&format!(
                    "{} (epoch {}): {} samples, {} entities\n",
                    e.checkpoint.file_name(),
                    e.checkpoint.epoch,
                    e.n_samples,
                    e.n_entities
                ));
                out.push_str(&format!("  results: {}\n", e.result_path.display()));
                for line in e.report.lines() {
                    out.push_str(&format!("  {line}\n"));
                }
            }
            CheckpointOutcome::Failed(f) => {
                out.push_str(&format!(
                    "{} (epoch {}): FAILED while {:?}: {}\n",
                    f.checkpoint.file_name(),
                    f.checkpoint.epoch,
                    f.state,
                    f.error
                ));
            }
        }
        out.push('\n');
    }

    let summary = EvaluationSummary::from_outcomes(outcomes);
    out.push_str(&format!(
        "Evaluated: {}\nFailed: {}\n",
        summary.evaluated, summary.failed
    ));
    out
}

pub fn render_rescore_text(outcome: &RescoreOutcome) -> String {
    let mut out = format!(
        "{}: {} samples, {} entities\n",
        outcome.table.display(),
        outcome.n_samples,
        outcome.n_entities
    );
    for line in outcome.report.lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
