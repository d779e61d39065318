use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{EvalError, Result};
use crate::table::CalibratedRow;

/// `<dir>/<stem><suffix>.csv`, where `stem` is the checkpoint file name up to
/// its first `.`.
pub fn result_path(checkpoint: &Path, suffix: &str) -> PathBuf {
    let name = checkpoint
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    let dir = checkpoint.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!("{stem}{suffix}.csv"))
}

/// Writes the per-sample table, replacing any previous file at `destination`.
pub fn write(rows: &[CalibratedRow], destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(destination)?);
    let mut w = csv::Writer::from_writer(file);
    if rows.is_empty() {
        w.write_record(["pdbid", "frame", "y_true", "y_pred", "weight"])?;
    }
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    info!("save results to {}", destination.display());
    Ok(())
}

pub fn read(path: &Path) -> Result<Vec<CalibratedRow>> {
    if !path.is_file() {
        return Err(EvalError::NotFound(path.to_path_buf()));
    }
    let mut r = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in r.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_sink.rs"]
mod tests;
