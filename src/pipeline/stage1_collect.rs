use tracing::debug;

use crate::error::{EvalError, Result};
use crate::inference::{Batch, Model, ScratchMemory};
use crate::table::PredictionTable;

/// Runs `model` over every batch and appends the flattened per-sample results
/// in iteration order. Any error drops the partial table.
pub fn collect<I, B, M, S>(batches: B, model: &mut M, scratch: &mut S) -> Result<PredictionTable>
where
    B: IntoIterator<Item = Result<Batch<I>>>,
    M: Model<I> + ?Sized,
    S: ScratchMemory + ?Sized,
{
    let mut table = PredictionTable::default();
    for (idx, batch) in batches.into_iter().enumerate() {
        let batch = batch?;
        let output = model.infer(&batch.input);
        // Released regardless of the forward pass outcome.
        scratch.release();
        let (y, weight) = output?.resolve()?;
        append_batch(&mut table, idx, batch, y, weight)?;
    }
    debug!("collected {} samples", table.len());
    Ok(table)
}

fn append_batch<I>(
    table: &mut PredictionTable,
    idx: usize,
    batch: Batch<I>,
    y: Vec<f64>,
    weight: Vec<f64>,
) -> Result<()> {
    let n = batch.entity_ids.len();
    let columns = [
        ("frame", batch.frames.len()),
        ("y_true", batch.targets.len()),
        ("y_pred", y.len()),
        ("weight", weight.len()),
    ];
    for (name, len) in columns {
        if len != n {
            return Err(EvalError::shape(format!("batch {idx} column {name}"), n, len));
        }
    }

    table.entity_ids.extend(batch.entity_ids);
    table.frames.extend(batch.frames);
    table.y_true.extend(batch.targets);
    table.y_pred_raw.extend(y);
    table.weights.extend(weight);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_collect.rs"]
mod tests;
