use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::checkpoint::{CheckpointPattern, EpochOrdering};
use crate::error::{EvalError, Result};
use crate::pipeline::stage2_calibrate::Calibration;
use crate::pipeline::stage3_aggregate::Reduction;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Dataset split handed to the dataset provider.
    pub split: String,
    /// Appended to the checkpoint stem when naming result tables.
    pub suffix: String,
    pub top_n: usize,
    pub ordering: EpochOrdering,
    pub descending: bool,
    pub calibration: Calibration,
    pub reduction: Reduction,
    pub pattern: CheckpointPattern,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            split: "test".to_string(),
            suffix: String::new(),
            top_n: DEFAULT_TOP_N,
            ordering: EpochOrdering::Lexical,
            descending: true,
            calibration: Calibration::affinity_v1(),
            reduction: Reduction::Mean,
            pattern: CheckpointPattern::default(),
        }
    }
}

impl EvalConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: EvalConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(EvalError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let cal = &self.calibration;
        if !cal.scale.is_finite() || !cal.offset.is_finite() {
            return Err(EvalError::Config(
                "calibration scale and offset must be finite".to_string(),
            ));
        }
        if cal.scale == 0.0 {
            return Err(EvalError::Config("calibration scale must be non-zero".to_string()));
        }
        if self.pattern.prefix.is_empty() || self.pattern.extension.is_empty() {
            return Err(EvalError::Config(
                "checkpoint prefix and extension must be non-empty".to_string(),
            ));
        }
        if self.suffix.contains(['/', '\\']) {
            return Err(EvalError::Config(format!(
                "suffix must not contain path separators: {}",
                self.suffix
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/config.rs"]
mod tests;
