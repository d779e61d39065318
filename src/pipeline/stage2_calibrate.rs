use serde::{Deserialize, Serialize};

use crate::table::{CalibratedRow, PredictionTable};

/// Fixed affine correction `y = raw * scale + offset`. The constants come from
/// training-distribution statistics; they are never fitted here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Calibration {
    pub scale: f64,
    pub offset: f64,
}

impl Calibration {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
        }
    }

    /// Label standardisation used by the affinity training runs.
    pub fn affinity_v1() -> Self {
        Self {
            scale: 1.9919705951218716,
            offset: 6.529300030461668,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == 0.0
    }

    pub fn apply_table(&self, table: PredictionTable) -> Vec<CalibratedRow> {
        let y_pred = calibrate(&table.y_pred_raw, self.scale, self.offset);
        table
            .entity_ids
            .into_iter()
            .zip(table.frames)
            .zip(table.y_true)
            .zip(y_pred)
            .zip(table.weights)
            .map(|((((entity_id, frame_id), y_true), y_pred), weight)| CalibratedRow {
                entity_id,
                frame_id,
                y_true,
                y_pred,
                weight,
            })
            .collect()
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::affinity_v1()
    }
}

pub fn calibrate(y_pred_raw: &[f64], scale: f64, offset: f64) -> Vec<f64> {
    y_pred_raw.iter().map(|&x| x * scale + offset).collect()
}

pub fn calibrate_inverse(y_pred: &[f64], scale: f64, offset: f64) -> Vec<f64> {
    y_pred.iter().map(|&y| (y - offset) / scale).collect()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_calibrate.rs"]
mod tests;
