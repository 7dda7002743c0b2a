//! Promover: Model Lifecycle & Promotion Library
//!
//! Manages the path a trained regression model takes from candidate artifact
//! to production traffic: metric evaluation, a deterministic promotion gate
//! against the current baseline, immutable versioned registration, a staged
//! deployment state machine with a human approval gate, and validated
//! rollback to any prior version.
//!
//! # Architecture
//!
//! - **`metrics`**: Pure regression metric computation (MAE, RMSE, R²)
//! - **`policy`**: Promote/reject decision from candidate vs. baseline metrics
//! - **`registry`**: Source of truth for artifact versions and stages, with
//!   durable persistence and per-model linearized mutations
//! - **`deploy`**: Staged rollout controller (smoke test + approval gate)
//! - **`rollback`**: Confirm-gated production pointer reversion
//! - **`lifecycle`**: Orchestrating pipeline from candidate to staging
//! - **`audit`**: Structured event records for the experiment tracker
//! - **`config`**: Strongly-typed, validated configuration
//!
//! # Example
//!
//! ```
//! use promover::registry::{Registry, store::InMemoryStore};
//! use promover::deploy::DeploymentController;
//! use std::collections::BTreeMap;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new(InMemoryStore::new());
//!
//! let mut metrics = BTreeMap::new();
//! metrics.insert("rmse".to_string(), 4.2);
//! let params = promover::config::ForecasterParams::default();
//!
//! let artifact = registry.register("sales-forecaster", "s3://models/run-1", metrics, &params)?;
//! assert_eq!(artifact.version, 1);
//!
//! let controller = DeploymentController::new(&registry);
//! controller.begin_staging("sales-forecaster", 1)?;
//! controller.record_smoke_test("sales-forecaster", 1, true)?;
//! controller.record_approval("sales-forecaster", 1, "ops@example.com")?;
//!
//! let live = registry.get_production("sales-forecaster")?.expect("promoted");
//! assert_eq!(live.version, 1);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod lifecycle;
pub mod metrics;
pub mod policy;
pub mod registry;
pub mod rollback;

pub use metrics::{evaluate, RegressionReport};
pub use policy::{decide, DecisionReason, PromotionDecision};
pub use registry::{ModelArtifact, Registry, Stage};
