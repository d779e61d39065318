pub mod json;
pub mod text;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    PearsonR,
    R2,
    Mae,
    Mse,
    Mape,
    Smape,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::PearsonR,
        Metric::R2,
        Metric::Mae,
        Metric::Mse,
        Metric::Mape,
        Metric::Smape,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::PearsonR => "pearson_r",
            Metric::R2 => "r2",
            Metric::Mae => "mae",
            Metric::Mse => "mse",
            Metric::Mape => "mape",
            Metric::Smape => "smape",
        }
    }
}

/// Metric values for one evaluated table, in `Metric::ALL` order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReport {
    pub n_points: usize,
    pub values: Vec<(Metric, f64)>,
}

impl MetricReport {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, v)| *v)
    }

    /// One `name: value` line per metric.
    pub fn lines(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|(m, v)| format!("{}: {}", m.name(), format_f64_6(*v)))
            .collect()
    }
}

pub fn format_f64_6(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    format!("{:.6}", v)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
