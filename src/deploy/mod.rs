//! Deployment Controller
//!
//! Drives the staged rollout of a registered artifact:
//! stage → smoke test → explicit human approval → production.
//!
//! The approval gate is modeled as explicit state rather than a blocking
//! wait: staging opens a gate at
//! [`GateStatus::AwaitingSmokeTest`], the serving collaborator reports the
//! smoke-test outcome, and an operator supplies the approval that triggers
//! the production promotion. Absent signals leave the artifact staged
//! indefinitely; this is a deliberate human-in-the-loop gate, and timeouts
//! belong to outer orchestration. Cancellation is its own transition back
//! to Registered or Archived.
//!
//! An archived artifact can never reach production through this
//! controller; that path belongs exclusively to
//! [`RollbackExecutor`](crate::rollback::RollbackExecutor).
//!
//! # Example
//!
//! ```
//! use promover::registry::{Registry, store::InMemoryStore};
//! use promover::deploy::DeploymentController;
//! use promover::config::ForecasterParams;
//! use std::collections::BTreeMap;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new(InMemoryStore::new());
//! let mut metrics = BTreeMap::new();
//! metrics.insert("rmse".to_string(), 4.2);
//! registry.register("sales-forecaster", "s3://models/run-1", metrics, &ForecasterParams::default())?;
//!
//! let controller = DeploymentController::new(&registry);
//! controller.begin_staging("sales-forecaster", 1)?;
//! controller.record_smoke_test("sales-forecaster", 1, true)?;
//! let live = controller.record_approval("sales-forecaster", 1, "ops@example.com")?;
//! assert_eq!(live.version, 1);
//! # Ok(())
//! # }
//! ```


use thiserror::Error;

use crate::registry::store::RegistryStore;
use crate::registry::{GateStatus, ModelArtifact, Registry, RegistryError};

/// Errors from deployment control.
#[derive(Debug, Error)]
pub enum DeployError {
    /// No production gate is open for the version; it was never staged, or
    /// its rollout already concluded.
    #[error("no deployment gate open for {model_name} v{version}")]
    GateNotFound { model_name: String, version: u32 },

    /// Approval arrived before a passing smoke test.
    #[error("cannot approve {model_name} v{version}: no passing smoke test recorded")]
    SmokeTestRequired { model_name: String, version: u32 },

    /// The artifact is not currently staged.
    #[error("{model_name} v{version} is not staged")]
    NotStaged { model_name: String, version: u32 },

    /// Underlying registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result alias for deployment operations.
pub type Result<T> = std::result::Result<T, DeployError>;

/// Orchestrates staged rollouts against the version registry.
///
/// Stateless itself: gate positions live in the registry document, so a
/// rollout in flight survives process restarts.
pub struct DeploymentController<'r, S: RegistryStore> {
    registry: &'r Registry<S>,
}

impl<'r, S: RegistryStore> DeploymentController<'r, S> {
    /// Create a controller over the given registry.
    pub fn new(registry: &'r Registry<S>) -> Self {
        Self { registry }
    }

    /// Deploy a candidate to staging for smoke testing.
    ///
    /// Permitted from Registered or Archived (the re-validation path).
    /// Opens the production gate at [`GateStatus::AwaitingSmokeTest`].
    pub fn begin_staging(&self, model_name: &str, version: u32) -> Result<ModelArtifact> {
        Ok(self.registry.promote_to_staging(model_name, version)?)
    }

    /// Record the smoke-test outcome reported by the serving collaborator.
    ///
    /// A pass moves the gate to [`GateStatus::AwaitingApproval`]; a failure
    /// leaves the artifact staged at [`GateStatus::SmokeFailed`] with no
    /// stage change, so the operator can retry the smoke test or cancel.
    pub fn record_smoke_test(
        &self,
        model_name: &str,
        version: u32,
        passed: bool,
    ) -> Result<GateStatus> {
        self.require_gate(model_name, version)?;
        let status = if passed { GateStatus::AwaitingApproval } else { GateStatus::SmokeFailed };
        match self.registry.update_gate(model_name, version, status) {
            Ok(()) => Ok(status),
            Err(RegistryError::GateNotFound { model_name, version }) => {
                Err(DeployError::GateNotFound { model_name, version })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Consume an operator approval and promote the artifact to production.
    ///
    /// Refused unless a passing smoke test was recorded first. Both signals
    /// present, the registry performs the atomic pointer swap and the gate
    /// is consumed.
    pub fn record_approval(
        &self,
        model_name: &str,
        version: u32,
        approver: &str,
    ) -> Result<ModelArtifact> {
        match self.require_gate(model_name, version)? {
            GateStatus::AwaitingApproval => {}
            GateStatus::AwaitingSmokeTest | GateStatus::SmokeFailed => {
                return Err(DeployError::SmokeTestRequired {
                    model_name: model_name.to_string(),
                    version,
                });
            }
        }
        let reason = format!("approved by {approver}");
        match self.registry.promote_to_production_with_reason(model_name, version, Some(&reason)) {
            Ok(artifact) => Ok(artifact),
            Err(RegistryError::InvalidTransition { model_name, version, .. }) => {
                Err(DeployError::NotStaged { model_name, version })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Cancel an in-flight rollout.
    ///
    /// Returns the artifact to Registered, or parks it at Archived when
    /// `archive` is set. The gate is discarded.
    pub fn cancel(&self, model_name: &str, version: u32, archive: bool) -> Result<ModelArtifact> {
        match self.registry.withdraw_from_staging(model_name, version, archive) {
            Ok(artifact) => Ok(artifact),
            Err(RegistryError::InvalidTransition { model_name, version, .. }) => {
                Err(DeployError::NotStaged { model_name, version })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Current gate position, or `None` when no rollout is in flight.
    pub fn gate_status(&self, model_name: &str, version: u32) -> Result<Option<GateStatus>> {
        Ok(self.registry.gate_status(model_name, version)?)
    }

    fn require_gate(&self, model_name: &str, version: u32) -> Result<GateStatus> {
        self.registry.gate_status(model_name, version)?.ok_or_else(|| DeployError::GateNotFound {
            model_name: model_name.to_string(),
            version,
        })
    }
}
