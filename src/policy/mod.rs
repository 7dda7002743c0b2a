//! Promotion Policy
//!
//! Decides whether a candidate model may replace the production baseline.
//! The gate is RMSE-only: RMSE penalizes large errors more than MAE, which
//! makes it the conservative comparison point. A candidate passes when its
//! RMSE does not exceed the baseline RMSE by more than the configured
//! regression tolerance; with the default tolerance of zero, equal is not a
//! regression.
//!
//! Pure decision logic: callers pass already-computed metrics, and the
//! resulting [`PromotionDecision`] is an immutable audit record.
//!
//! # Example
//!
//! ```
//! use promover::policy::{decide, DecisionReason};
//! use promover::config::PromotionThresholds;
//! use std::collections::BTreeMap;
//!
//! let mut candidate = BTreeMap::new();
//! candidate.insert("rmse".to_string(), 4.0);
//!
//! let decision = decide(&candidate, None, &PromotionThresholds::default());
//! assert!(decision.approved);
//! assert_eq!(decision.reason, DecisionReason::NoBaseline);
//! ```


use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PromotionThresholds;

/// Metric key consulted by the promotion gate.
pub const GATE_METRIC: &str = "rmse";

/// Enumerated justification for a promotion decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// No production baseline exists; the first candidate always wins.
    NoBaseline,
    /// Candidate RMSE is strictly below the baseline.
    ImprovedRmse,
    /// Candidate RMSE is within the configured tolerance of the baseline.
    WithinTolerance,
    /// Candidate RMSE exceeds the tolerated regression bound.
    RegressionExceedsThreshold,
    /// Candidate metrics carry no RMSE entry; rejected outright rather
    /// than promoting an unmeasured model.
    MissingCandidateMetric,
}

impl DecisionReason {
    /// Snake-case name, matching the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionReason::NoBaseline => "no_baseline",
            DecisionReason::ImprovedRmse => "improved_rmse",
            DecisionReason::WithinTolerance => "within_tolerance",
            DecisionReason::RegressionExceedsThreshold => "regression_exceeds_threshold",
            DecisionReason::MissingCandidateMetric => "missing_candidate_metric",
        }
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of comparing a candidate against the incumbent baseline.
///
/// Immutable once produced; kept as the audit record of why a promotion or
/// rejection happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionDecision {
    /// Version assigned to the candidate, once registered. `None` for
    /// rejected candidates, which never receive a version.
    pub candidate_version: Option<u32>,
    /// Version of the production baseline, or `None` for the first model.
    pub baseline_version: Option<u32>,
    /// Whether the candidate may proceed.
    pub approved: bool,
    /// Why the decision went the way it did.
    pub reason: DecisionReason,
    /// Candidate RMSE consulted by the gate (NaN when absent).
    pub candidate_rmse: f64,
    /// Baseline RMSE consulted by the gate.
    pub baseline_rmse: Option<f64>,
}

/// Decide whether a candidate may be promoted over the baseline.
///
/// - No baseline: always approved with [`DecisionReason::NoBaseline`]. A
///   baseline metric map without an RMSE entry is treated the same way.
/// - Otherwise approved iff candidate RMSE ≤ baseline RMSE ×
///   (1 + `regression_tolerance`).
///
/// The returned decision carries `candidate_version: None`; the lifecycle
/// pipeline fills the version in after registration.
#[must_use]
pub fn decide(
    candidate: &BTreeMap<String, f64>,
    baseline: Option<&BTreeMap<String, f64>>,
    thresholds: &PromotionThresholds,
) -> PromotionDecision {
    let baseline_rmse = baseline.and_then(|m| m.get(GATE_METRIC).copied());

    let Some(candidate_rmse) = candidate.get(GATE_METRIC).copied() else {
        return PromotionDecision {
            candidate_version: None,
            baseline_version: None,
            approved: false,
            reason: DecisionReason::MissingCandidateMetric,
            candidate_rmse: f64::NAN,
            baseline_rmse,
        };
    };

    let (approved, reason) = match baseline_rmse {
        None => (true, DecisionReason::NoBaseline),
        Some(base) => {
            let bound = base * (1.0 + thresholds.regression_tolerance);
            if candidate_rmse < base {
                (true, DecisionReason::ImprovedRmse)
            } else if candidate_rmse <= bound {
                (true, DecisionReason::WithinTolerance)
            } else {
                (false, DecisionReason::RegressionExceedsThreshold)
            }
        }
    };

    PromotionDecision {
        candidate_version: None,
        baseline_version: None,
        approved,
        reason,
        candidate_rmse,
        baseline_rmse,
    }
}
