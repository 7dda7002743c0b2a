//! Tests for CLI command handlers
//!
//! Each test drives `run_command` against a registry rooted in a temp
//! directory, the same way separate operator invocations would.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::cli::{
    ApproveArgs, CancelArgs, Cli, Command, HistoryArgs, RegisterArgs, RollbackArgs, SmokeArgs,
    SmokeOutcome, StageArgs, StatusArgs, SubmitArgs,
};

use super::run_command;

/// Workspace with a lifecycle config pointing at temp registry and audit
/// paths.
struct CliHarness {
    _dir: TempDir,
    config_path: PathBuf,
    root: PathBuf,
}

impl CliHarness {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let root = dir.path().to_path_buf();
        let config_path = root.join("promover.yaml");
        std::fs::write(
            &config_path,
            format!(
                "registry_dir: {}\naudit_log: {}\n",
                root.join("registry").display(),
                root.join("audit.jsonl").display()
            ),
        )
        .expect("write should succeed");
        Self { _dir: dir, config_path, root }
    }

    fn run(&self, command: Command) -> Result<(), super::CliError> {
        run_command(Cli {
            command,
            config: Some(self.config_path.clone()),
            verbose: false,
            quiet: true,
        })
    }

    fn write_json(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, contents).expect("write should succeed");
        path
    }

    fn register(&self, version_uri: &str, rmse: f64) {
        let metrics = self.write_json(
            &format!("metrics-{rmse}.json"),
            &format!("{{\"mae\": {:.2}, \"rmse\": {rmse:.2}}}", rmse * 0.8),
        );
        self.run(Command::Register(RegisterArgs {
            model: "m".to_string(),
            artifact_uri: version_uri.to_string(),
            metrics_file: metrics,
            params_file: None,
        }))
        .expect("register should succeed");
    }

    fn full_rollout(&self, version: u32) {
        self.run(Command::Stage(StageArgs { model: "m".to_string(), version }))
            .expect("stage should succeed");
        self.run(Command::Smoke(SmokeArgs {
            model: "m".to_string(),
            version,
            outcome: SmokeOutcome::Pass,
        }))
        .expect("smoke should succeed");
        self.run(Command::Approve(ApproveArgs {
            model: "m".to_string(),
            version,
            approver: "ops".to_string(),
        }))
        .expect("approve should succeed");
    }
}

fn status(harness: &CliHarness, model: Option<&str>) -> Result<(), super::CliError> {
    harness.run(Command::Status(StatusArgs { model: model.map(String::from) }))
}

// ---------------------------------------------------------------------------
// Register / status / history
// ---------------------------------------------------------------------------

#[test]
fn test_register_then_status() {
    let harness = CliHarness::new();
    harness.register("s3://models/run-1", 5.0);
    status(&harness, Some("m")).expect("status should succeed");
    status(&harness, None).expect("status should succeed");
}

#[test]
fn test_status_unknown_model_fails() {
    let harness = CliHarness::new();
    let err = status(&harness, Some("ghost")).unwrap_err();
    assert_eq!(err.code, 1);
    assert!(err.message.contains("ghost"));
}

#[test]
fn test_history_lists_versions() {
    let harness = CliHarness::new();
    harness.register("s3://models/run-1", 5.0);
    harness.register("s3://models/run-2", 4.0);
    harness
        .run(Command::History(HistoryArgs { model: "m".to_string() }))
        .expect("history should succeed");
}

#[test]
fn test_history_unknown_model_fails() {
    let harness = CliHarness::new();
    let err = harness.run(Command::History(HistoryArgs { model: "m".to_string() })).unwrap_err();
    assert_eq!(err.code, 1);
}

#[test]
fn test_register_missing_metrics_file_fails() {
    let harness = CliHarness::new();
    let err = harness
        .run(Command::Register(RegisterArgs {
            model: "m".to_string(),
            artifact_uri: "s3://models/run-1".to_string(),
            metrics_file: harness.root.join("missing.json"),
            params_file: None,
        }))
        .unwrap_err();
    assert_eq!(err.code, 1);
    assert!(err.message.contains("missing.json"));
}

// ---------------------------------------------------------------------------
// Staged rollout across separate invocations
// ---------------------------------------------------------------------------

#[test]
fn test_rollout_survives_separate_invocations() {
    let harness = CliHarness::new();
    harness.register("s3://models/run-1", 5.0);
    // Each harness.run builds a fresh context: state flows through disk.
    harness.full_rollout(1);
    status(&harness, Some("m")).expect("status should succeed");
}

#[test]
fn test_approve_without_smoke_fails() {
    let harness = CliHarness::new();
    harness.register("s3://models/run-1", 5.0);
    harness
        .run(Command::Stage(StageArgs { model: "m".to_string(), version: 1 }))
        .expect("stage should succeed");

    let err = harness
        .run(Command::Approve(ApproveArgs {
            model: "m".to_string(),
            version: 1,
            approver: "ops".to_string(),
        }))
        .unwrap_err();
    assert_eq!(err.code, 1);
    assert!(err.message.contains("smoke"));
}

#[test]
fn test_cancel_staged_rollout() {
    let harness = CliHarness::new();
    harness.register("s3://models/run-1", 5.0);
    harness
        .run(Command::Stage(StageArgs { model: "m".to_string(), version: 1 }))
        .expect("stage should succeed");
    harness
        .run(Command::Cancel(CancelArgs { model: "m".to_string(), version: 1, archive: false }))
        .expect("cancel should succeed");
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[test]
fn test_submit_approves_first_candidate() {
    let harness = CliHarness::new();
    let predictions = harness.write_json("predictions.json", "[118.0, 132.0, 141.0]");
    let actuals = harness.write_json("actuals.json", "[120.0, 130.0, 144.0]");

    harness
        .run(Command::Submit(SubmitArgs {
            model: "m".to_string(),
            artifact_uri: "s3://models/run-1".to_string(),
            predictions_file: predictions,
            actuals_file: actuals,
            params_file: None,
        }))
        .expect("submit should succeed");
    status(&harness, Some("m")).expect("status should succeed");
}

#[test]
fn test_submit_mismatched_series_fails() {
    let harness = CliHarness::new();
    let predictions = harness.write_json("predictions.json", "[1.0, 2.0]");
    let actuals = harness.write_json("actuals.json", "[1.0, 2.0, 3.0]");

    let err = harness
        .run(Command::Submit(SubmitArgs {
            model: "m".to_string(),
            artifact_uri: "s3://models/run-1".to_string(),
            predictions_file: predictions,
            actuals_file: actuals,
            params_file: None,
        }))
        .unwrap_err();
    assert_eq!(err.code, 1);
    assert!(err.message.contains("length mismatch"));
}

// ---------------------------------------------------------------------------
// Rollback exit codes
// ---------------------------------------------------------------------------

#[test]
fn test_rollback_dry_run_and_confirm() {
    let harness = CliHarness::new();
    harness.register("s3://models/run-1", 5.0);
    harness.register("s3://models/run-2", 4.0);
    harness.full_rollout(1);
    harness.full_rollout(2);

    // Dry run: exit 0.
    harness
        .run(Command::Rollback(RollbackArgs { model: "m".to_string(), version: 1, confirm: false }))
        .expect("dry run should succeed");

    // Confirmed: exit 0.
    harness
        .run(Command::Rollback(RollbackArgs { model: "m".to_string(), version: 1, confirm: true }))
        .expect("rollback should succeed");
}

#[test]
fn test_rollback_to_live_version_exit_code_two() {
    let harness = CliHarness::new();
    harness.register("s3://models/run-1", 5.0);
    harness.full_rollout(1);

    let err = harness
        .run(Command::Rollback(RollbackArgs { model: "m".to_string(), version: 1, confirm: true }))
        .unwrap_err();
    assert_eq!(err.code, 2);
    assert!(err.message.contains("already in production"));
}

#[test]
fn test_rollback_unknown_version_exit_code_one() {
    let harness = CliHarness::new();
    harness.register("s3://models/run-1", 5.0);
    let err = harness
        .run(Command::Rollback(RollbackArgs { model: "m".to_string(), version: 9, confirm: true }))
        .unwrap_err();
    assert_eq!(err.code, 1);
    assert!(err.message.contains("not found"));
}

// ---------------------------------------------------------------------------
// Audit log side effects
// ---------------------------------------------------------------------------

#[test]
fn test_commands_append_to_audit_log() {
    let harness = CliHarness::new();
    harness.register("s3://models/run-1", 5.0);
    harness.full_rollout(1);

    let text = std::fs::read_to_string(harness.root.join("audit.jsonl"))
        .expect("audit log should exist");
    assert!(text.lines().count() >= 3);
    assert!(text.contains("\"event\":\"registered\""));
    assert!(text.contains("\"event\":\"stage_changed\""));
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

#[test]
fn test_parse_rollback_invocation() {
    use clap::Parser;

    let cli = Cli::try_parse_from([
        "promover", "rollback", "sales-forecaster", "--version", "2", "--confirm",
    ])
    .expect("parse should succeed");
    assert!(matches!(
        cli.command,
        Command::Rollback(RollbackArgs { version: 2, confirm: true, .. })
    ));
}

#[test]
fn test_parse_smoke_outcome() {
    use clap::Parser;

    let cli = Cli::try_parse_from([
        "promover", "smoke", "m", "--version", "1", "--outcome", "fail",
    ])
    .expect("parse should succeed");
    assert!(matches!(
        cli.command,
        Command::Smoke(SmokeArgs { outcome: SmokeOutcome::Fail, .. })
    ));
}

#[test]
fn test_parse_rejects_missing_version() {
    use clap::Parser;

    assert!(Cli::try_parse_from(["promover", "stage", "m"]).is_err());
}
