//! Tests for audit sinks

use super::*;

use crate::policy::{DecisionReason, PromotionDecision};

fn sample_event() -> AuditEvent {
    AuditEvent::StageChanged {
        model_name: "sales-forecaster".to_string(),
        version: 3,
        from: Some(Stage::Staging),
        to: Stage::Production,
        reason: Some("approved by ops".to_string()),
        recorded_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// In-memory sink
// ---------------------------------------------------------------------------

#[test]
fn test_in_memory_sink_records_in_order() {
    let sink = InMemoryAuditSink::new();
    sink.record(&sample_event()).expect("operation should succeed");
    sink.record(&AuditEvent::RolledBack {
        model_name: "sales-forecaster".to_string(),
        restored_version: 1,
        displaced_version: Some(3),
        recorded_at: Utc::now(),
    })
    .expect("operation should succeed");

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], AuditEvent::StageChanged { .. }));
    assert!(matches!(events[1], AuditEvent::RolledBack { .. }));
}

#[test]
fn test_null_sink_discards() {
    let sink = NullAuditSink;
    sink.record(&sample_event()).expect("operation should succeed");
}

// ---------------------------------------------------------------------------
// JSON-lines sink
// ---------------------------------------------------------------------------

#[test]
fn test_jsonl_sink_appends_one_line_per_event() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("audit.jsonl");

    let sink = JsonlAuditSink::open(&path).expect("open should succeed");
    sink.record(&sample_event()).expect("operation should succeed");
    sink.record(&sample_event()).expect("operation should succeed");

    let text = std::fs::read_to_string(&path).expect("read should succeed");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let parsed: AuditEvent =
        serde_json::from_str(lines[0]).expect("JSON deserialization should succeed");
    assert!(matches!(parsed, AuditEvent::StageChanged { version: 3, .. }));
}

#[test]
fn test_jsonl_sink_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("audit.jsonl");

    {
        let sink = JsonlAuditSink::open(&path).expect("open should succeed");
        sink.record(&sample_event()).expect("operation should succeed");
    }
    {
        let sink = JsonlAuditSink::open(&path).expect("open should succeed");
        sink.record(&sample_event()).expect("operation should succeed");
    }

    let text = std::fs::read_to_string(&path).expect("read should succeed");
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn test_jsonl_sink_creates_parent_directory() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("nested/logs/audit.jsonl");

    let sink = JsonlAuditSink::open(&path).expect("open should succeed");
    sink.record(&sample_event()).expect("operation should succeed");
    assert!(path.exists());
}

// ---------------------------------------------------------------------------
// Event serialization
// ---------------------------------------------------------------------------

#[test]
fn test_event_tagged_serialization() {
    let json = serde_json::to_string(&sample_event()).expect("JSON serialization should succeed");
    assert!(json.contains("\"event\":\"stage_changed\""));
}

#[test]
fn test_decision_event_roundtrip() {
    let event = AuditEvent::Decision {
        model_name: "sales-forecaster".to_string(),
        decision: PromotionDecision {
            candidate_version: Some(4),
            baseline_version: Some(2),
            approved: true,
            reason: DecisionReason::ImprovedRmse,
            candidate_rmse: 3.5,
            baseline_rmse: Some(4.0),
        },
        recorded_at: Utc::now(),
    };
    let json = serde_json::to_string(&event).expect("JSON serialization should succeed");
    let back: AuditEvent = serde_json::from_str(&json).expect("JSON parse should succeed");
    assert_eq!(back, event);
}
