//! Regression Metrics Evaluator
//!
//! Computes standard error metrics from predictions against ground truth.
//! Pure functions over IEEE-754 doubles: no state, no I/O, identical inputs
//! produce identical outputs.
//!
//! # Example
//!
//! ```
//! use promover::metrics::evaluate;
//!
//! let report = evaluate(&[3.0, 5.0, 7.0], &[2.0, 5.0, 9.0]).expect("valid inputs");
//! assert!((report.mae - 1.0).abs() < 1e-9);
//! assert!(report.rmse >= report.mae);
//! ```


use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from metric evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Predictions and ground truth have different lengths.
    #[error("length mismatch: {predictions} predictions vs {actuals} actuals")]
    LengthMismatch { predictions: usize, actuals: usize },

    /// One or both input sequences are empty.
    #[error("empty input: at least one observation is required")]
    EmptyInput,

    /// All ground-truth values are identical, so SS_tot = 0 and R² is
    /// undefined.
    #[error("degenerate target: all ground-truth values are identical, R\u{b2} is undefined")]
    DegenerateTarget,
}

/// Result type for metric evaluation.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Standard regression error metrics for one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
}

impl RegressionReport {
    /// Convert into the metric map stored on a registered artifact.
    ///
    /// Keys are `"mae"`, `"rmse"`, and `"r2"`.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        map.insert("mae".to_string(), self.mae);
        map.insert("rmse".to_string(), self.rmse);
        map.insert("r2".to_string(), self.r2);
        map
    }
}

/// Evaluate predictions against ground truth.
///
/// Computes MAE = mean(|pred - actual|), RMSE = sqrt(mean((pred - actual)²)),
/// and R² = 1 - SS_res / SS_tot.
///
/// # Errors
///
/// - [`EvalError::EmptyInput`] if either sequence is empty
/// - [`EvalError::LengthMismatch`] if the sequences differ in length
/// - [`EvalError::DegenerateTarget`] if all ground-truth values are identical
pub fn evaluate(predictions: &[f64], actuals: &[f64]) -> Result<RegressionReport> {
    if predictions.is_empty() || actuals.is_empty() {
        return Err(EvalError::EmptyInput);
    }
    if predictions.len() != actuals.len() {
        return Err(EvalError::LengthMismatch {
            predictions: predictions.len(),
            actuals: actuals.len(),
        });
    }

    let n = actuals.len() as f64;
    let mean_actual = actuals.iter().sum::<f64>() / n;

    let ss_tot: f64 = actuals.iter().map(|a| (a - mean_actual).powi(2)).sum();
    if ss_tot == 0.0 {
        return Err(EvalError::DegenerateTarget);
    }

    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    for (p, a) in predictions.iter().zip(actuals) {
        let err = p - a;
        abs_sum += err.abs();
        sq_sum += err * err;
    }

    Ok(RegressionReport {
        mae: abs_sum / n,
        rmse: (sq_sum / n).sqrt(),
        r2: 1.0 - sq_sum / ss_tot,
    })
}
