//! Version Registry
//!
//! Single source of truth for artifact identity and deployment stage.
//! Assigns monotonically increasing version numbers per model name, tracks
//! which version holds each stage, and persists every mutation durably
//! through a pluggable [`RegistryStore`](store::RegistryStore).
//!
//! # Invariants
//!
//! - Versions start at 1 and increase by exactly one per registration;
//!   they are never reused.
//! - At most one artifact per model name holds [`Stage::Production`]; the
//!   displaced artifact becomes [`Stage::Archived`] in the same commit.
//! - Mutations on one model name are linearized through a per-model
//!   exclusive section with a bounded wait; independent model names mutate
//!   in parallel. Readers see pre- or post-commit state, never a partial
//!   transition.
//! - A mutation commits by saving the updated state to the store first and
//!   swapping it into memory second; a failed save leaves the pre-call
//!   state untouched.
//!
//! # Example
//!
//! ```
//! use promover::registry::{Registry, Stage, store::InMemoryStore};
//! use promover::config::ForecasterParams;
//! use std::collections::BTreeMap;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new(InMemoryStore::new());
//! let mut metrics = BTreeMap::new();
//! metrics.insert("rmse".to_string(), 4.2);
//!
//! let artifact =
//!     registry.register("sales-forecaster", "s3://models/run-1", metrics, &ForecasterParams::default())?;
//! assert_eq!(artifact.version, 1);
//! assert_eq!(artifact.stage, Stage::Registered);
//! # Ok(())
//! # }
//! ```

pub mod store;


use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, RwLockWriteGuard, TryLockError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::audit::{AuditEvent, AuditSink, NullAuditSink};
use crate::config::ForecasterParams;
use store::{RegistryStore, StoreError};

/// Deployment lifecycle position of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Accepted into the registry, not yet deployed anywhere.
    Registered,
    /// Deployed for smoke testing, awaiting the production gate.
    Staging,
    /// Serving production traffic.
    Production,
    /// Displaced from staging or production; remains eligible for rollback.
    Archived,
}

impl Stage {
    /// Display name for the stage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Registered => "Registered",
            Stage::Staging => "Staging",
            Stage::Production => "Production",
            Stage::Archived => "Archived",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position of a staged artifact inside the production gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateStatus {
    /// Waiting for the serving collaborator to report a smoke-test result.
    AwaitingSmokeTest,
    /// Last smoke test failed; the artifact stays staged until an operator
    /// retries or cancels.
    SmokeFailed,
    /// Smoke test passed; waiting for an explicit human approval.
    AwaitingApproval,
}

impl GateStatus {
    /// Display name for the gate position.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GateStatus::AwaitingSmokeTest => "awaiting smoke test",
            GateStatus::SmokeFailed => "smoke test failed",
            GateStatus::AwaitingApproval => "awaiting approval",
        }
    }
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable trained artifact plus its registration metadata.
///
/// Everything except `stage` is fixed at registration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Logical model line this artifact belongs to.
    pub model_name: String,
    /// Registry-assigned version, unique and strictly increasing per model.
    pub version: u32,
    /// When the artifact was registered.
    pub created_at: DateTime<Utc>,
    /// Reference to the trained estimator in artifact storage.
    pub artifact_uri: String,
    /// Held-out evaluation metrics, fixed at registration.
    pub metrics: BTreeMap<String, f64>,
    /// Training hyperparameters, kept for reproducibility and audit.
    pub hyperparameters: ForecasterParams,
    /// Content fingerprint used by the duplicate-registration guard.
    pub fingerprint: String,
    /// Current deployment stage.
    pub stage: Stage,
}

/// Audit record of one stage change, kept in the registry document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTransition {
    /// Artifact version that moved.
    pub version: u32,
    /// Previous stage; `None` for the initial registration.
    pub from: Option<Stage>,
    /// New stage.
    pub to: Stage,
    /// When the transition committed.
    pub at: DateTime<Utc>,
    /// Optional operator-facing explanation.
    pub reason: Option<String>,
}

/// Durable per-model registry state.
///
/// Owned exclusively by the [`Registry`]; all other components read through
/// it and never mutate it directly. Artifacts are append-only in ascending
/// version order, so history is never lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryState {
    /// Model name this document belongs to.
    pub model_name: String,
    /// Every artifact ever registered, ascending by version.
    pub artifacts: Vec<ModelArtifact>,
    /// Version currently marked Production, if any.
    pub production_version: Option<u32>,
    /// Version currently marked Staging, if any.
    pub staging_version: Option<u32>,
    /// Production-gate position per staged version.
    #[serde(default)]
    pub gates: BTreeMap<u32, GateStatus>,
    /// Full stage-transition history, append-only.
    #[serde(default)]
    pub transitions: Vec<StageTransition>,
}

impl RegistryState {
    fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            artifacts: Vec::new(),
            production_version: None,
            staging_version: None,
            gates: BTreeMap::new(),
            transitions: Vec::new(),
        }
    }

    /// Look up an artifact by version.
    #[must_use]
    pub fn artifact(&self, version: u32) -> Option<&ModelArtifact> {
        self.artifacts.iter().find(|a| a.version == version)
    }

    /// Apply a stage change and record it in the transition history.
    ///
    /// Returns the previous stage, or `None` if the version is unknown.
    fn set_stage(
        &mut self,
        version: u32,
        to: Stage,
        reason: Option<&str>,
        at: DateTime<Utc>,
    ) -> Option<Stage> {
        let artifact = self.artifacts.iter_mut().find(|a| a.version == version)?;
        let from = artifact.stage;
        artifact.stage = to;
        self.transitions.push(StageTransition {
            version,
            from: Some(from),
            to,
            at,
            reason: reason.map(String::from),
        });
        Some(from)
    }
}

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No state exists for the model name.
    #[error("unknown model: {0}")]
    ModelNotFound(String),

    /// The referenced version was never registered.
    #[error("version not found: {model_name} v{version}")]
    VersionNotFound { model_name: String, version: u32 },

    /// The newest artifact already carries this logical content.
    #[error("duplicate registration for {model_name}: content already registered as v{version}")]
    DuplicateRegistration { model_name: String, version: u32 },

    /// The artifact is not in a stage that permits the requested change.
    #[error("invalid transition for {model_name} v{version}: {from} -> {to}")]
    InvalidTransition { model_name: String, version: u32, from: Stage, to: Stage },

    /// No deployment gate is open for the version.
    #[error("no deployment gate open for {model_name} v{version}")]
    GateNotFound { model_name: String, version: u32 },

    /// The per-model exclusive section could not be acquired within the
    /// bounded wait. Transient; callers may retry with backoff.
    #[error("registry busy for model {model_name}; retry later")]
    Busy { model_name: String },

    /// Persistence failed; the operation rolled back to the pre-call state.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// The version registry.
///
/// One instance per process owns all registry state. Mutations on a model
/// name are serialized through that model's slot lock; reads take the same
/// lock shared and therefore observe only committed state.
pub struct Registry<S: RegistryStore> {
    store: S,
    slots: Mutex<HashMap<String, Arc<RwLock<RegistryState>>>>,
    audit: Arc<dyn AuditSink>,
    lock_wait: Duration,
}

impl<S: RegistryStore> Registry<S> {
    /// Create a registry over the given store, with audit disabled and the
    /// default 5-second lock wait.
    pub fn new(store: S) -> Self {
        Self {
            store,
            slots: Mutex::new(HashMap::new()),
            audit: Arc::new(NullAuditSink),
            lock_wait: Duration::from_secs(5),
        }
    }

    /// Attach an audit sink receiving every mutation event.
    #[must_use]
    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    /// Override the bounded wait for the per-model exclusive section.
    #[must_use]
    pub fn with_lock_wait(mut self, wait: Duration) -> Self {
        self.lock_wait = wait;
        self
    }

    /// Register a new artifact, assigning the next version number.
    ///
    /// The first artifact for a model name receives version 1; later ones
    /// receive the previous maximum plus one. The artifact starts at
    /// [`Stage::Registered`].
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateRegistration`] if the newest artifact
    /// already carries an identical content fingerprint (a retried
    /// transaction), plus the usual [`RegistryError::Busy`] /
    /// [`RegistryError::Store`] cases.
    pub fn register(
        &self,
        model_name: &str,
        artifact_uri: &str,
        metrics: BTreeMap<String, f64>,
        hyperparameters: &ForecasterParams,
    ) -> Result<ModelArtifact> {
        let fingerprint = fingerprint_of(model_name, artifact_uri, &metrics, hyperparameters)?;
        self.mutate(model_name, |state, events| {
            if let Some(last) = state.artifacts.last() {
                if last.fingerprint == fingerprint {
                    return Err(RegistryError::DuplicateRegistration {
                        model_name: model_name.to_string(),
                        version: last.version,
                    });
                }
            }
            let version = state.artifacts.last().map_or(1, |a| a.version + 1);
            let now = Utc::now();
            let artifact = ModelArtifact {
                model_name: model_name.to_string(),
                version,
                created_at: now,
                artifact_uri: artifact_uri.to_string(),
                metrics: metrics.clone(),
                hyperparameters: hyperparameters.clone(),
                fingerprint: fingerprint.clone(),
                stage: Stage::Registered,
            };
            state.artifacts.push(artifact.clone());
            state.transitions.push(StageTransition {
                version,
                from: None,
                to: Stage::Registered,
                at: now,
                reason: None,
            });
            events.push(AuditEvent::Registered {
                model_name: model_name.to_string(),
                version,
                artifact_uri: artifact_uri.to_string(),
                recorded_at: now,
            });
            Ok(artifact)
        })
    }

    /// Move an artifact into staging.
    ///
    /// The artifact must currently be [`Stage::Registered`] or
    /// [`Stage::Archived`] (the re-validation path). Any artifact already
    /// staged for this model is displaced to [`Stage::Archived`], and a
    /// fresh production gate opens at
    /// [`GateStatus::AwaitingSmokeTest`].
    pub fn promote_to_staging(&self, model_name: &str, version: u32) -> Result<ModelArtifact> {
        self.mutate(model_name, |state, events| {
            let artifact = state.artifact(version).ok_or_else(|| not_found(model_name, version))?;
            match artifact.stage {
                Stage::Registered | Stage::Archived => {}
                from => {
                    return Err(RegistryError::InvalidTransition {
                        model_name: model_name.to_string(),
                        version,
                        from,
                        to: Stage::Staging,
                    })
                }
            }
            let now = Utc::now();
            if let Some(displaced) = state.staging_version {
                let from = state.set_stage(displaced, Stage::Archived, Some("displaced from staging"), now);
                events.push(AuditEvent::StageChanged {
                    model_name: model_name.to_string(),
                    version: displaced,
                    from,
                    to: Stage::Archived,
                    reason: Some("displaced from staging".to_string()),
                    recorded_at: now,
                });
                state.gates.remove(&displaced);
            }
            let from = state.set_stage(version, Stage::Staging, None, now);
            state.staging_version = Some(version);
            state.gates.insert(version, GateStatus::AwaitingSmokeTest);
            events.push(AuditEvent::StageChanged {
                model_name: model_name.to_string(),
                version,
                from,
                to: Stage::Staging,
                reason: None,
                recorded_at: now,
            });
            state.artifact(version).cloned().ok_or_else(|| not_found(model_name, version))
        })
    }

    /// Promote the staged artifact to production.
    ///
    /// The artifact must currently be [`Stage::Staging`]. The displaced
    /// production artifact (if any) becomes [`Stage::Archived`] in the same
    /// commit, so readers never observe two production artifacts or none
    /// where one existed.
    pub fn promote_to_production(&self, model_name: &str, version: u32) -> Result<ModelArtifact> {
        self.promote_to_production_with_reason(model_name, version, None)
    }

    /// [`Registry::promote_to_production`] with an operator-facing reason
    /// recorded on the transition (e.g. who approved the rollout).
    pub(crate) fn promote_to_production_with_reason(
        &self,
        model_name: &str,
        version: u32,
        reason: Option<&str>,
    ) -> Result<ModelArtifact> {
        self.mutate(model_name, |state, events| {
            let artifact = state.artifact(version).ok_or_else(|| not_found(model_name, version))?;
            if artifact.stage != Stage::Staging {
                return Err(RegistryError::InvalidTransition {
                    model_name: model_name.to_string(),
                    version,
                    from: artifact.stage,
                    to: Stage::Production,
                });
            }
            let now = Utc::now();
            if let Some(displaced) = state.production_version {
                let from = state.set_stage(displaced, Stage::Archived, Some("displaced by promotion"), now);
                events.push(AuditEvent::StageChanged {
                    model_name: model_name.to_string(),
                    version: displaced,
                    from,
                    to: Stage::Archived,
                    reason: Some("displaced by promotion".to_string()),
                    recorded_at: now,
                });
            }
            let from = state.set_stage(version, Stage::Production, reason, now);
            state.production_version = Some(version);
            if state.staging_version == Some(version) {
                state.staging_version = None;
            }
            state.gates.remove(&version);
            events.push(AuditEvent::StageChanged {
                model_name: model_name.to_string(),
                version,
                from,
                to: Stage::Production,
                reason: reason.map(String::from),
                recorded_at: now,
            });
            state.artifact(version).cloned().ok_or_else(|| not_found(model_name, version))
        })
    }

    /// Cancel a staged rollout, returning the artifact to
    /// [`Stage::Registered`] or parking it at [`Stage::Archived`].
    pub fn withdraw_from_staging(
        &self,
        model_name: &str,
        version: u32,
        archive: bool,
    ) -> Result<ModelArtifact> {
        let to = if archive { Stage::Archived } else { Stage::Registered };
        self.mutate(model_name, |state, events| {
            let artifact = state.artifact(version).ok_or_else(|| not_found(model_name, version))?;
            if artifact.stage != Stage::Staging {
                return Err(RegistryError::InvalidTransition {
                    model_name: model_name.to_string(),
                    version,
                    from: artifact.stage,
                    to,
                });
            }
            let now = Utc::now();
            let from = state.set_stage(version, to, Some("staging cancelled"), now);
            state.staging_version = None;
            state.gates.remove(&version);
            events.push(AuditEvent::StageChanged {
                model_name: model_name.to_string(),
                version,
                from,
                to,
                reason: Some("staging cancelled".to_string()),
                recorded_at: now,
            });
            state.artifact(version).cloned().ok_or_else(|| not_found(model_name, version))
        })
    }

    /// Swap the production pointer to an arbitrary registered version.
    ///
    /// This is the rollback path: the one transition that may take an
    /// archived artifact straight to production, bypassing staging. The
    /// displaced production artifact becomes [`Stage::Archived`] in the
    /// same commit. Swapping to the version already in production is
    /// rejected as an invalid transition; [`crate::rollback`] surfaces that
    /// as the no-op error.
    ///
    /// Returns the restored artifact and the displaced version, if any.
    pub(crate) fn rollback_production(
        &self,
        model_name: &str,
        target_version: u32,
    ) -> Result<(ModelArtifact, Option<u32>)> {
        self.mutate(model_name, |state, events| {
            state.artifact(target_version).ok_or_else(|| not_found(model_name, target_version))?;
            if state.production_version == Some(target_version) {
                return Err(RegistryError::InvalidTransition {
                    model_name: model_name.to_string(),
                    version: target_version,
                    from: Stage::Production,
                    to: Stage::Production,
                });
            }
            let now = Utc::now();
            let displaced = state.production_version;
            if let Some(prev) = displaced {
                let from = state.set_stage(prev, Stage::Archived, Some("displaced by rollback"), now);
                events.push(AuditEvent::StageChanged {
                    model_name: model_name.to_string(),
                    version: prev,
                    from,
                    to: Stage::Archived,
                    reason: Some("displaced by rollback".to_string()),
                    recorded_at: now,
                });
            }
            if state.staging_version == Some(target_version) {
                state.staging_version = None;
                state.gates.remove(&target_version);
            }
            let from = state.set_stage(target_version, Stage::Production, Some("rollback"), now);
            state.production_version = Some(target_version);
            events.push(AuditEvent::StageChanged {
                model_name: model_name.to_string(),
                version: target_version,
                from,
                to: Stage::Production,
                reason: Some("rollback".to_string()),
                recorded_at: now,
            });
            events.push(AuditEvent::RolledBack {
                model_name: model_name.to_string(),
                restored_version: target_version,
                displaced_version: displaced,
                recorded_at: now,
            });
            let restored = state
                .artifact(target_version)
                .cloned()
                .ok_or_else(|| not_found(model_name, target_version))?;
            Ok((restored, displaced))
        })
    }

    /// Update the production-gate position for a staged version.
    pub fn update_gate(&self, model_name: &str, version: u32, status: GateStatus) -> Result<()> {
        self.mutate(model_name, |state, events| {
            state.artifact(version).ok_or_else(|| not_found(model_name, version))?;
            match state.gates.get_mut(&version) {
                Some(slot) => {
                    *slot = status;
                    events.push(AuditEvent::GateUpdated {
                        model_name: model_name.to_string(),
                        version,
                        status,
                        recorded_at: Utc::now(),
                    });
                    Ok(())
                }
                None => Err(RegistryError::GateNotFound {
                    model_name: model_name.to_string(),
                    version,
                }),
            }
        })
    }

    /// Artifact currently serving production traffic, if any.
    pub fn get_production(&self, model_name: &str) -> Result<Option<ModelArtifact>> {
        self.read(model_name, |state| {
            state.production_version.and_then(|v| state.artifact(v).cloned())
        })
    }

    /// Artifact currently staged, if any.
    pub fn get_staging(&self, model_name: &str) -> Result<Option<ModelArtifact>> {
        self.read(model_name, |state| {
            state.staging_version.and_then(|v| state.artifact(v).cloned())
        })
    }

    /// Fetch one artifact by version.
    pub fn get_artifact(&self, model_name: &str, version: u32) -> Result<ModelArtifact> {
        self.read(model_name, |state| state.artifact(version).cloned())?
            .ok_or_else(|| not_found(model_name, version))
    }

    /// Every artifact for a model, ascending by version. Empty for an
    /// unknown model name.
    pub fn list_versions(&self, model_name: &str) -> Result<Vec<ModelArtifact>> {
        self.read(model_name, |state| state.artifacts.clone())
    }

    /// Full stage-transition history for a model, oldest first.
    pub fn transition_history(&self, model_name: &str) -> Result<Vec<StageTransition>> {
        self.read(model_name, |state| state.transitions.clone())
    }

    /// Gate position for a staged version, or `None` if no gate is open.
    pub fn gate_status(&self, model_name: &str, version: u32) -> Result<Option<GateStatus>> {
        self.read(model_name, |state| state.gates.get(&version).copied())
    }

    /// Consistent snapshot of a model's full state.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ModelNotFound`] if nothing was ever registered
    /// under the name.
    pub fn snapshot(&self, model_name: &str) -> Result<RegistryState> {
        let state = self.read(model_name, Clone::clone)?;
        if state.artifacts.is_empty() {
            return Err(RegistryError::ModelNotFound(model_name.to_string()));
        }
        Ok(state)
    }

    /// Every model name with saved registry state, sorted.
    pub fn list_models(&self) -> Result<Vec<String>> {
        Ok(self.store.list_models()?)
    }

    fn slot(&self, model_name: &str) -> Result<Arc<RwLock<RegistryState>>> {
        let mut slots = self.slots.lock().expect("slot map lock poisoned");
        if let Some(slot) = slots.get(model_name) {
            return Ok(Arc::clone(slot));
        }
        let state = self
            .store
            .load(model_name)?
            .unwrap_or_else(|| RegistryState::new(model_name));
        let slot = Arc::new(RwLock::new(state));
        slots.insert(model_name.to_string(), Arc::clone(&slot));
        Ok(slot)
    }

    /// Acquire the model's exclusive section within the bounded wait.
    fn write_guard<'a>(
        &self,
        slot: &'a RwLock<RegistryState>,
        model_name: &str,
    ) -> Result<RwLockWriteGuard<'a, RegistryState>> {
        let deadline = Instant::now() + self.lock_wait;
        loop {
            match slot.try_write() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(RegistryError::Busy { model_name: model_name.to_string() });
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
            }
        }
    }

    /// Run one linearized mutation against a model's state.
    ///
    /// The operation works on a clone; the clone is saved to the store and
    /// only then swapped into memory, so any failure partway leaves the
    /// pre-call state observable. Audit events are delivered after the
    /// commit, and a sink failure never un-commits the mutation.
    fn mutate<T>(
        &self,
        model_name: &str,
        op: impl FnOnce(&mut RegistryState, &mut Vec<AuditEvent>) -> Result<T>,
    ) -> Result<T> {
        let slot = self.slot(model_name)?;
        let mut guard = self.write_guard(&slot, model_name)?;
        let mut next = guard.clone();
        let mut events = Vec::new();
        let out = op(&mut next, &mut events)?;
        self.store.save(model_name, &next)?;
        *guard = next;
        drop(guard);
        for event in &events {
            let _ = self.audit.record(event);
        }
        Ok(out)
    }

    fn read<T>(&self, model_name: &str, f: impl FnOnce(&RegistryState) -> T) -> Result<T> {
        let slot = self.slot(model_name)?;
        let guard = slot.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(f(&guard))
    }
}

fn not_found(model_name: &str, version: u32) -> RegistryError {
    RegistryError::VersionNotFound { model_name: model_name.to_string(), version }
}

/// Content fingerprint over the logical registration payload.
///
/// Metric keys are iterated in `BTreeMap` order, so the digest is canonical
/// for a given payload.
fn fingerprint_of(
    model_name: &str,
    artifact_uri: &str,
    metrics: &BTreeMap<String, f64>,
    hyperparameters: &ForecasterParams,
) -> Result<String> {
    let metrics_json = serde_json::to_string(metrics).map_err(StoreError::Json)?;
    let params_json = serde_json::to_string(hyperparameters).map_err(StoreError::Json)?;
    let mut hasher = Sha256::new();
    hasher.update(model_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(artifact_uri.as_bytes());
    hasher.update([0u8]);
    hasher.update(metrics_json.as_bytes());
    hasher.update([0u8]);
    hasher.update(params_json.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
