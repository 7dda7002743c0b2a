//! Rollback Executor
//!
//! Reverts the production pointer to a previously registered version,
//! bypassing the staging gate. This is the emergency path: the target is
//! validated (it must exist, differ from the live version, and carry
//! stored metrics), and the swap itself is the registry's atomic pointer
//! exchange, so readers never observe a half-applied reversion.
//!
//! Without an explicit confirmation the executor only returns a dry-run
//! preview of what would change and performs no mutation.
//!
//! # Example
//!
//! ```
//! use promover::registry::{Registry, store::InMemoryStore};
//! use promover::deploy::DeploymentController;
//! use promover::rollback::{RollbackExecutor, RollbackOutcome};
//! use promover::config::ForecasterParams;
//! use std::collections::BTreeMap;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new(InMemoryStore::new());
//! let controller = DeploymentController::new(&registry);
//! for i in 1..=2u32 {
//!     let mut metrics = BTreeMap::new();
//!     metrics.insert("rmse".to_string(), 5.0 - f64::from(i));
//!     registry.register("sales-forecaster", &format!("s3://models/run-{i}"), metrics,
//!         &ForecasterParams::default())?;
//!     controller.begin_staging("sales-forecaster", i)?;
//!     controller.record_smoke_test("sales-forecaster", i, true)?;
//!     controller.record_approval("sales-forecaster", i, "ops")?;
//! }
//!
//! let executor = RollbackExecutor::new(&registry);
//! match executor.rollback("sales-forecaster", 1, true)? {
//!     RollbackOutcome::Committed(receipt) => assert_eq!(receipt.restored_version, 1),
//!     RollbackOutcome::DryRun(_) => unreachable!("confirmed rollback commits"),
//! }
//! # Ok(())
//! # }
//! ```


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::store::RegistryStore;
use crate::registry::{Registry, RegistryError, Stage};

/// Errors from rollback execution.
#[derive(Debug, Error)]
pub enum RollbackError {
    /// The target is already the live production version. Rejected, never
    /// silently accepted.
    #[error("{model_name} v{version} is already in production; nothing to roll back")]
    NoOpRollback { model_name: String, version: u32 },

    /// The target record carries no metrics; refusing to route traffic to
    /// an artifact that was never fully registered.
    #[error("{model_name} v{version} has no stored metrics; refusing rollback to an unhealthy target")]
    UnhealthyTarget { model_name: String, version: u32 },

    /// Underlying registry failure (including a missing target version).
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result alias for rollback operations.
pub type Result<T> = std::result::Result<T, RollbackError>;

/// Preview of the pointer swap a confirmed rollback would perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackPlan {
    pub model_name: String,
    /// Version that would become production.
    pub target_version: u32,
    /// Stage the target currently holds.
    pub target_stage: Stage,
    /// Version that would be displaced to Archived, if any.
    pub displaced_version: Option<u32>,
}

/// Receipt for a committed rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackReceipt {
    pub model_name: String,
    /// Version now serving production traffic.
    pub restored_version: u32,
    /// Version displaced to Archived, if any.
    pub displaced_version: Option<u32>,
    /// When the swap committed.
    pub completed_at: DateTime<Utc>,
}

/// What a rollback invocation did.
#[derive(Debug, Clone, PartialEq)]
pub enum RollbackOutcome {
    /// Confirmation was absent: this is what would change. No mutation was
    /// performed.
    DryRun(RollbackPlan),
    /// The pointer swap committed.
    Committed(RollbackReceipt),
}

/// Executes validated production rollbacks against the registry.
pub struct RollbackExecutor<'r, S: RegistryStore> {
    registry: &'r Registry<S>,
}

impl<'r, S: RegistryStore> RollbackExecutor<'r, S> {
    /// Create an executor over the given registry.
    pub fn new(registry: &'r Registry<S>) -> Self {
        Self { registry }
    }

    /// Revert production to `target_version`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::VersionNotFound`] (wrapped) if the target was
    ///   never registered
    /// - [`RollbackError::NoOpRollback`] if the target is already live;
    ///   invoking rollback twice to the same target hits this guard on the
    ///   second call
    /// - [`RollbackError::UnhealthyTarget`] if the target has no stored
    ///   metrics
    pub fn rollback(
        &self,
        model_name: &str,
        target_version: u32,
        confirm: bool,
    ) -> Result<RollbackOutcome> {
        let target = self.registry.get_artifact(model_name, target_version)?;
        let production = self.registry.get_production(model_name)?;

        if production.as_ref().map(|a| a.version) == Some(target_version) {
            return Err(RollbackError::NoOpRollback {
                model_name: model_name.to_string(),
                version: target_version,
            });
        }
        if target.metrics.is_empty() {
            return Err(RollbackError::UnhealthyTarget {
                model_name: model_name.to_string(),
                version: target_version,
            });
        }

        if !confirm {
            return Ok(RollbackOutcome::DryRun(RollbackPlan {
                model_name: model_name.to_string(),
                target_version,
                target_stage: target.stage,
                displaced_version: production.map(|a| a.version),
            }));
        }

        match self.registry.rollback_production(model_name, target_version) {
            Ok((restored, displaced)) => Ok(RollbackOutcome::Committed(RollbackReceipt {
                model_name: model_name.to_string(),
                restored_version: restored.version,
                displaced_version: displaced,
                completed_at: Utc::now(),
            })),
            // The registry re-checks the self-rollback guard inside the
            // model's exclusive section; surface it as the no-op error.
            Err(RegistryError::InvalidTransition { model_name, version, .. }) => {
                Err(RollbackError::NoOpRollback { model_name, version })
            }
            Err(e) => Err(e.into()),
        }
    }
}
