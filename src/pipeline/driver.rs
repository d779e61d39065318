use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use crate::checkpoint::CheckpointRecord;
use crate::config::EvalConfig;
use crate::error::{EvalError, Result};
use crate::inference::{Dataset, Model, NoScratch, ScratchMemory};
use crate::pipeline::stage1_collect::collect;
use crate::pipeline::stage3_aggregate::{FrameReduction, aggregate, first_seen_order};
use crate::pipeline::stage4_sink::{self, result_path};
use crate::pipeline::stage5_metrics::compute;
use crate::report::MetricReport;
use crate::table::split_aligned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalState {
    Loading,
    Running,
    Aggregating,
    Reporting,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct CheckpointEvaluation {
    pub checkpoint: CheckpointRecord,
    pub result_path: PathBuf,
    pub n_samples: usize,
    pub n_entities: usize,
    pub report: MetricReport,
}

#[derive(Debug)]
pub struct CheckpointFailure {
    pub checkpoint: CheckpointRecord,
    /// State the evaluation was in when it failed.
    pub state: EvalState,
    pub error: EvalError,
}

#[derive(Debug)]
pub enum CheckpointOutcome {
    Evaluated(CheckpointEvaluation),
    Failed(CheckpointFailure),
}

impl CheckpointOutcome {
    pub fn state(&self) -> EvalState {
        match self {
            CheckpointOutcome::Evaluated(_) => EvalState::Done,
            CheckpointOutcome::Failed(_) => EvalState::Failed,
        }
    }

    pub fn report(&self) -> Option<&MetricReport> {
        match self {
            CheckpointOutcome::Evaluated(e) => Some(&e.report),
            CheckpointOutcome::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EvaluationSummary {
    pub evaluated: usize,
    pub failed: usize,
}

impl EvaluationSummary {
    pub fn from_outcomes(outcomes: &[CheckpointOutcome]) -> Self {
        let mut s = Self::default();
        for o in outcomes {
            match o {
                CheckpointOutcome::Evaluated(_) => s.evaluated += 1,
                CheckpointOutcome::Failed(_) => s.failed += 1,
            }
        }
        s
    }
}

/// Evaluates checkpoints one at a time against a single model instance.
pub struct EvaluationDriver<M, D, S = NoScratch> {
    model: M,
    dataset: D,
    scratch: S,
    config: EvalConfig,
}

impl<M, D> EvaluationDriver<M, D, NoScratch> {
    pub fn new(model: M, dataset: D, config: EvalConfig) -> Self {
        Self {
            model,
            dataset,
            scratch: NoScratch,
            config,
        }
    }
}

impl<M, D, S> EvaluationDriver<M, D, S>
where
    D: Dataset,
    M: Model<D::Input>,
    S: ScratchMemory,
{
    pub fn with_scratch<S2: ScratchMemory>(self, scratch: S2) -> EvaluationDriver<M, D, S2> {
        EvaluationDriver {
            model: self.model,
            dataset: self.dataset,
            scratch,
            config: self.config,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn scratch(&self) -> &S {
        &self.scratch
    }

    /// Runs every record in order. A failed checkpoint is logged and recorded;
    /// the next one starts from a fresh weight load.
    pub fn run_all(&mut self, records: &[CheckpointRecord]) -> Vec<CheckpointOutcome> {
        if self.config.calibration.is_identity() {
            info!("calibration is identity, predictions are persisted as produced");
        }
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            match self.evaluate(record) {
                Ok(evaluation) => outcomes.push(CheckpointOutcome::Evaluated(evaluation)),
                Err(failure) => {
                    error!(
                        checkpoint = %failure.checkpoint.path.display(),
                        epoch = %failure.checkpoint.epoch,
                        state = ?failure.state,
                        kind = failure.error.kind(),
                        "skipping checkpoint: {}",
                        failure.error
                    );
                    outcomes.push(CheckpointOutcome::Failed(failure));
                }
            }
        }
        let summary = EvaluationSummary::from_outcomes(&outcomes);
        info!(
            "evaluated {} checkpoint(s), {} failed",
            summary.evaluated, summary.failed
        );
        outcomes
    }

    pub fn evaluate(
        &mut self,
        record: &CheckpointRecord,
    ) -> Result<CheckpointEvaluation, CheckpointFailure> {
        let mut state = EvalState::Loading;
        self.advance(record, &mut state)
            .map_err(|error| CheckpointFailure {
                checkpoint: record.clone(),
                state,
                error,
            })
    }

    fn advance(
        &mut self,
        record: &CheckpointRecord,
        state: &mut EvalState,
    ) -> Result<CheckpointEvaluation> {
        info!("evaluating checkpoint file {}", record.path.display());

        *state = EvalState::Loading;
        self.model.load_checkpoint(&record.path)?;

        *state = EvalState::Running;
        let batches = self.dataset.open(&self.config.split)?;
        let table = collect(batches, &mut self.model, &mut self.scratch)?;
        let n_samples = table.len();

        *state = EvalState::Aggregating;
        table.validate()?;
        let rows = self.config.calibration.apply_table(table);
        let ids = first_seen_order(&rows);
        let entities = aggregate(&rows, &ids, &self.config.reduction);

        // The per-sample table is written before metrics so it survives a
        // metric failure.
        *state = EvalState::Reporting;
        let path = result_path(&record.path, &self.config.suffix);
        stage4_sink::write(&rows, &path)?;
        let (y_true, y_pred) = split_aligned(&entities);
        let report = compute(&y_true, &y_pred)?;
        for line in report.lines() {
            info!("{line}");
        }

        *state = EvalState::Done;
        Ok(CheckpointEvaluation {
            checkpoint: record.clone(),
            result_path: path,
            n_samples,
            n_entities: entities.len(),
            report,
        })
    }
}

/// Result of re-scoring a persisted per-sample table.
#[derive(Debug, Clone)]
pub struct RescoreOutcome {
    pub table: PathBuf,
    pub n_samples: usize,
    pub n_entities: usize,
    pub report: MetricReport,
}

/// Aggregates and scores a table written by the sink. The stored predictions
/// are already calibrated.
pub fn rescore<R>(table: &Path, reduction: &R) -> Result<RescoreOutcome>
where
    R: FrameReduction + ?Sized,
{
    let rows = stage4_sink::read(table)?;
    let ids = first_seen_order(&rows);
    let entities = aggregate(&rows, &ids, reduction);
    let (y_true, y_pred) = split_aligned(&entities);
    let report = compute(&y_true, &y_pred)?;
    Ok(RescoreOutcome {
        table: table.to_path_buf(),
        n_samples: rows.len(),
        n_entities: entities.len(),
        report,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/driver.rs"]
mod tests;
