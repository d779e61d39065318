use crate::error::{EvalError, Result};
use crate::report::{Metric, MetricReport};

/// Denominator floor for the percentage metrics when `y_true` (or
/// `|y_true| + |y_pred|`) is zero.
pub const PERCENT_EPS: f64 = 1.17e-6;

pub const MIN_POINTS: usize = 2;

/// Computes every metric over aligned `(y_true, y_pred)` pairs. Non-finite
/// input turns every metric into NaN.
pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<MetricReport> {
    if y_true.len() != y_pred.len() {
        return Err(EvalError::shape("metric inputs", y_true.len(), y_pred.len()));
    }
    let n = y_true.len();
    if n < MIN_POINTS {
        return Err(EvalError::InsufficientData {
            needed: MIN_POINTS,
            found: n,
        });
    }

    let finite = y_true.iter().chain(y_pred).all(|v| v.is_finite());
    let values = Metric::ALL
        .iter()
        .map(|&m| {
            let v = if finite {
                evaluate(m, y_true, y_pred)
            } else {
                f64::NAN
            };
            (m, v)
        })
        .collect();
    Ok(MetricReport {
        n_points: n,
        values,
    })
}

fn evaluate(metric: Metric, y_true: &[f64], y_pred: &[f64]) -> f64 {
    match metric {
        Metric::PearsonR => pearson_r(y_true, y_pred),
        Metric::R2 => r2_score(y_true, y_pred),
        Metric::Mae => mean_absolute_error(y_true, y_pred),
        Metric::Mse => mean_squared_error(y_true, y_pred),
        Metric::Mape => mean_absolute_percentage_error(y_true, y_pred),
        Metric::Smape => symmetric_mean_absolute_percentage_error(y_true, y_pred),
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_of<F>(y_true: &[f64], y_pred: &[f64], f: F) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    let sum: f64 = y_true.iter().zip(y_pred).map(|(&t, &p)| f(t, p)).sum();
    sum / y_true.len() as f64
}

/// NaN when either series has zero variance.
pub fn pearson_r(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let mt = mean(y_true);
    let mp = mean(y_pred);
    let mut cov = 0.0;
    let mut vt = 0.0;
    let mut vp = 0.0;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        let dt = t - mt;
        let dp = p - mp;
        cov += dt * dp;
        vt += dt * dt;
        vp += dp * dp;
    }
    let denom = (vt * vp).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let mt = mean(y_true);
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        ss_res += (t - p) * (t - p);
        ss_tot += (t - mt) * (t - mt);
    }
    1.0 - ss_res / ss_tot
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mean_of(y_true, y_pred, |t, p| (t - p).abs())
}

pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mean_of(y_true, y_pred, |t, p| (t - p) * (t - p))
}

pub fn mean_absolute_percentage_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mean_of(y_true, y_pred, |t, p| (t - p).abs() / floor_eps(t.abs()))
}

pub fn symmetric_mean_absolute_percentage_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mean_of(y_true, y_pred, |t, p| {
        2.0 * (t - p).abs() / floor_eps(t.abs() + p.abs())
    })
}

// f64::max would swallow NaN.
fn floor_eps(denom: f64) -> f64 {
    if denom < PERCENT_EPS { PERCENT_EPS } else { denom }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_metrics.rs"]
mod tests;
