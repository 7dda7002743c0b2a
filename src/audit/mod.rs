//! Audit Events
//!
//! Every promotion decision and every registry mutation is emitted as a
//! structured record through a pluggable [`AuditSink`]. Persistence and
//! querying belong to the experiment-tracking collaborator; this module only
//! defines the records and the delivery seam.
//!
//! A sink failure never un-commits the mutation that produced the event:
//! events are recorded after the durable commit, and delivery errors are
//! swallowed by the emitter.
//!
//! # Example
//!
//! ```
//! use promover::audit::{AuditEvent, AuditSink, InMemoryAuditSink};
//! use promover::registry::Stage;
//! use chrono::Utc;
//!
//! let sink = InMemoryAuditSink::new();
//! sink.record(&AuditEvent::Registered {
//!     model_name: "sales-forecaster".to_string(),
//!     version: 1,
//!     artifact_uri: "s3://models/run-1".to_string(),
//!     recorded_at: Utc::now(),
//! }).expect("in-memory sink never fails");
//! assert_eq!(sink.events().len(), 1);
//! ```

#[cfg(test)]
mod tests;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::PromotionDecision;
use crate::registry::{GateStatus, Stage};

/// Errors from audit event delivery.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// A structured record of one lifecycle occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A new artifact entered the registry.
    Registered {
        model_name: String,
        version: u32,
        artifact_uri: String,
        recorded_at: DateTime<Utc>,
    },
    /// An artifact moved between stages.
    StageChanged {
        model_name: String,
        version: u32,
        from: Option<Stage>,
        to: Stage,
        reason: Option<String>,
        recorded_at: DateTime<Utc>,
    },
    /// A staged artifact's production-gate position changed.
    GateUpdated {
        model_name: String,
        version: u32,
        status: GateStatus,
        recorded_at: DateTime<Utc>,
    },
    /// A promotion decision was taken for a candidate.
    Decision {
        model_name: String,
        decision: PromotionDecision,
        recorded_at: DateTime<Utc>,
    },
    /// The production pointer was reverted to a prior version.
    RolledBack {
        model_name: String,
        restored_version: u32,
        displaced_version: Option<u32>,
        recorded_at: DateTime<Utc>,
    },
}

/// Delivery seam for audit events.
///
/// Implementations must be safe to call from concurrent registry mutations
/// on independent model names.
pub trait AuditSink: Send + Sync {
    /// Deliver one event.
    fn record(&self, event: &AuditEvent) -> Result<()>;
}

/// Sink that discards every event.
#[derive(Debug, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _event: &AuditEvent) -> Result<()> {
        Ok(())
    }
}

/// In-memory sink for tests and embedded callers.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event recorded so far, in delivery order.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit event lock poisoned").clone()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        self.events.lock().expect("audit event lock poisoned").push(event.clone());
        Ok(())
    }
}

/// JSON-lines file sink: one serialized event per line, append-only.
#[derive(Debug)]
pub struct JsonlAuditSink {
    file: Mutex<std::fs::File>,
}

impl JsonlAuditSink {
    /// Open (or create) the log file for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        let line = serde_json::to_string(event)?;
        let mut file = self.file.lock().expect("audit file lock poisoned");
        writeln!(file, "{line}")?;
        Ok(())
    }
}
