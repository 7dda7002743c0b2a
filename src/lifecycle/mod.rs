//! Lifecycle Pipeline
//!
//! The orchestrating facade over evaluation, the promotion gate, the
//! registry, and the deployment controller. A training collaborator hands
//! over a candidate (artifact reference, held-out predictions, ground
//! truth, hyperparameters); the pipeline scores it, compares it against the
//! production baseline, and, only if the gate approves, registers it and
//! begins its staged rollout. Rejected candidates are never registered:
//! versions belong to winners.
//!
//! Every decision, approved or rejected, is delivered to the audit sink.
//!
//! # Example
//!
//! ```
//! use promover::lifecycle::LifecyclePipeline;
//! use promover::registry::{Registry, store::InMemoryStore};
//! use promover::config::{ForecasterParams, PromotionThresholds};
//! use promover::policy::DecisionReason;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new(InMemoryStore::new());
//! let pipeline = LifecyclePipeline::new(&registry, PromotionThresholds::default());
//!
//! let outcome = pipeline.submit_candidate(
//!     "sales-forecaster",
//!     "s3://models/run-1",
//!     &[118.0, 132.0, 141.0],
//!     &[120.0, 130.0, 144.0],
//!     &ForecasterParams::default(),
//! )?;
//! assert!(outcome.decision.approved);
//! assert_eq!(outcome.decision.reason, DecisionReason::NoBaseline);
//! assert_eq!(outcome.artifact.map(|a| a.version), Some(1));
//! # Ok(())
//! # }
//! ```


use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::audit::{AuditEvent, AuditSink, NullAuditSink};
use crate::config::{ConfigError, ForecasterParams, PromotionThresholds};
use crate::deploy::{DeployError, DeploymentController};
use crate::metrics::{evaluate, EvalError};
use crate::policy::{decide, PromotionDecision};
use crate::registry::store::RegistryStore;
use crate::registry::{ModelArtifact, Registry, RegistryError};

/// Errors from candidate submission.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("evaluation failed: {0}")]
    Eval(#[from] EvalError),

    #[error("invalid hyperparameters: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// Result alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;

/// What happened to a submitted candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateOutcome {
    /// The promotion decision, with versions filled in.
    pub decision: PromotionDecision,
    /// The registered artifact, now staged. `None` for rejected candidates.
    pub artifact: Option<ModelArtifact>,
}

/// Candidate-to-staging pipeline.
pub struct LifecyclePipeline<'r, S: RegistryStore> {
    registry: &'r Registry<S>,
    thresholds: PromotionThresholds,
    audit: Arc<dyn AuditSink>,
}

impl<'r, S: RegistryStore> LifecyclePipeline<'r, S> {
    /// Create a pipeline over the given registry with audit disabled.
    pub fn new(registry: &'r Registry<S>, thresholds: PromotionThresholds) -> Self {
        Self { registry, thresholds, audit: Arc::new(NullAuditSink) }
    }

    /// Attach an audit sink receiving every promotion decision.
    #[must_use]
    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    /// Run one candidate through evaluate → decide → register → stage.
    ///
    /// `predictions` and `actuals` come from the held-out evaluation set.
    /// On approval the candidate receives the next version number and
    /// enters staging with its production gate open; on rejection nothing
    /// is registered and the decision records why.
    pub fn submit_candidate(
        &self,
        model_name: &str,
        artifact_uri: &str,
        predictions: &[f64],
        actuals: &[f64],
        hyperparameters: &ForecasterParams,
    ) -> Result<CandidateOutcome> {
        hyperparameters.validate()?;
        let candidate_metrics = evaluate(predictions, actuals)?.into_map();

        let baseline = self.registry.get_production(model_name)?;
        let mut decision = decide(
            &candidate_metrics,
            baseline.as_ref().map(|a| &a.metrics),
            &self.thresholds,
        );
        decision.baseline_version = baseline.map(|a| a.version);

        let artifact = if decision.approved {
            let artifact =
                self.registry.register(model_name, artifact_uri, candidate_metrics, hyperparameters)?;
            decision.candidate_version = Some(artifact.version);
            let controller = DeploymentController::new(self.registry);
            let staged = controller.begin_staging(model_name, artifact.version)?;
            Some(staged)
        } else {
            None
        };

        // Sink failures must not undo the work above.
        let _ = self.audit.record(&AuditEvent::Decision {
            model_name: model_name.to_string(),
            decision: decision.clone(),
            recorded_at: Utc::now(),
        });

        Ok(CandidateOutcome { decision, artifact })
    }
}
