use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EvalError, Result};

/// How epoch keys are compared when selecting checkpoints.
///
/// `Lexical` compares the raw epoch strings, so `"2"` sorts above `"10"`.
/// This is the inherited behavior of the training runs' bulk evaluation and
/// stays the default. `Numeric` compares epoch values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EpochOrdering {
    #[default]
    Lexical,
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckpointPattern {
    pub prefix: String,
    pub extension: String,
}

impl Default for CheckpointPattern {
    fn default() -> Self {
        Self {
            prefix: "checkpoint".to_string(),
            extension: "pt".to_string(),
        }
    }
}

impl CheckpointPattern {
    // Epoch must start with 1-9: `checkpoint_best` / `checkpoint_last` never match.
    fn to_regex(&self) -> Result<Regex> {
        let expr = format!(
            r"^{}([1-9][0-9]*)\.(?:.*\.)?{}$",
            regex::escape(&self.prefix),
            regex::escape(&self.extension)
        );
        Regex::new(&expr).map_err(|e| EvalError::Config(format!("checkpoint pattern: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochKey(String);

impl EpochKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn compare(&self, other: &EpochKey, ordering: EpochOrdering) -> Ordering {
        match ordering {
            EpochOrdering::Lexical => self.0.cmp(&other.0),
            // Keys are digit strings without leading zeros, so length decides first.
            EpochOrdering::Numeric => self
                .0
                .len()
                .cmp(&other.0.len())
                .then_with(|| self.0.cmp(&other.0)),
        }
    }
}

impl std::fmt::Display for EpochKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointRecord {
    pub epoch: EpochKey,
    pub path: PathBuf,
}

impl CheckpointRecord {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Scans `directory` for epoch-numbered checkpoints. Entries are visited in
/// file-name order so that the scan order is reproducible.
pub fn list_checkpoints(directory: &Path, pattern: &CheckpointPattern) -> Result<Vec<CheckpointRecord>> {
    if !directory.is_dir() {
        return Err(EvalError::NotFound(directory.to_path_buf()));
    }
    let re = pattern.to_regex()?;

    // Lossy names are only used for matching; records keep the entry path.
    let mut entries = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push((name, entry.path()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut records = Vec::new();
    for (name, path) in entries {
        let Some(caps) = re.captures(&name) else {
            continue;
        };
        let epoch = EpochKey::new(&caps[1]);
        debug!("found checkpoint {name} (epoch {epoch})");
        records.push(CheckpointRecord { epoch, path });
    }

    info!(
        "discovered {} checkpoint(s) in {}",
        records.len(),
        directory.display()
    );
    Ok(records)
}

/// Stable sort by epoch key, then keep the first `n`.
pub fn select_top_n(
    records: &[CheckpointRecord],
    n: usize,
    ordering: EpochOrdering,
    descending: bool,
) -> Vec<CheckpointRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ord = a.epoch.compare(&b.epoch, ordering);
        if descending { ord.reverse() } else { ord }
    });
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
#[path = "../../tests/src_inline/checkpoint/tests.rs"]
mod tests;
