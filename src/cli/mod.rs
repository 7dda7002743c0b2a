//! CLI module for promover
//!
//! Defines the operator-facing command surface and its argument types.
//! Command handlers live in [`commands`]; each maps domain errors to a
//! human-readable message and a distinct exit code
//! (0 success, 1 failure, 2 rejected no-op).

mod commands;
mod logging;

pub use commands::{run_command, CliError};
pub use logging::LogLevel;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Promover: model lifecycle and promotion control
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "promover")]
#[command(version)]
#[command(about = "Model lifecycle control: register, stage, approve, and roll back model versions")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to the lifecycle configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Register a trained artifact with pre-computed metrics
    Register(RegisterArgs),

    /// Evaluate a candidate, apply the promotion gate, and stage the winner
    Submit(SubmitArgs),

    /// Deploy a registered version to staging for smoke testing
    Stage(StageArgs),

    /// Record a smoke-test outcome for a staged version
    Smoke(SmokeArgs),

    /// Approve a staged version for production
    Approve(ApproveArgs),

    /// Cancel an in-flight staged rollout
    Cancel(CancelArgs),

    /// Revert the production pointer to a prior version
    Rollback(RollbackArgs),

    /// Show the deployment state of one model, or of every model
    Status(StatusArgs),

    /// List registered versions and stage history for a model
    History(HistoryArgs),
}

/// Arguments for the register command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RegisterArgs {
    /// Logical model name (e.g. "sales-forecaster")
    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Artifact storage reference for the trained estimator
    #[arg(long, value_name = "URI")]
    pub artifact_uri: String,

    /// JSON file mapping metric names to values
    #[arg(long, value_name = "PATH")]
    pub metrics_file: PathBuf,

    /// YAML file with forecaster hyperparameters (defaults when omitted)
    #[arg(long, value_name = "PATH")]
    pub params_file: Option<PathBuf>,
}

/// Arguments for the submit command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SubmitArgs {
    /// Logical model name
    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Artifact storage reference for the trained estimator
    #[arg(long, value_name = "URI")]
    pub artifact_uri: String,

    /// JSON array of held-out predictions
    #[arg(long, value_name = "PATH")]
    pub predictions_file: PathBuf,

    /// JSON array of held-out ground-truth values
    #[arg(long, value_name = "PATH")]
    pub actuals_file: PathBuf,

    /// YAML file with forecaster hyperparameters (defaults when omitted)
    #[arg(long, value_name = "PATH")]
    pub params_file: Option<PathBuf>,
}

/// Arguments for the stage command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct StageArgs {
    /// Logical model name
    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Version to deploy to staging
    #[arg(long)]
    pub version: u32,
}

/// Smoke-test outcome reported by the serving collaborator
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokeOutcome {
    /// The staged version answered the smoke checks
    Pass,
    /// The staged version failed the smoke checks
    Fail,
}

/// Arguments for the smoke command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SmokeArgs {
    /// Logical model name
    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Staged version the outcome applies to
    #[arg(long)]
    pub version: u32,

    /// Smoke-test outcome
    #[arg(long, value_enum)]
    pub outcome: SmokeOutcome,
}

/// Arguments for the approve command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ApproveArgs {
    /// Logical model name
    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Staged version to approve
    #[arg(long)]
    pub version: u32,

    /// Who is approving, recorded in the stage history
    #[arg(long, value_name = "NAME")]
    pub approver: String,
}

/// Arguments for the cancel command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct CancelArgs {
    /// Logical model name
    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Staged version to withdraw
    #[arg(long)]
    pub version: u32,

    /// Park the version at Archived instead of returning it to Registered
    #[arg(long)]
    pub archive: bool,
}

/// Arguments for the rollback command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RollbackArgs {
    /// Logical model name
    #[arg(value_name = "MODEL")]
    pub model: String,

    /// Version to restore to production
    #[arg(long)]
    pub version: u32,

    /// Actually perform the swap; without this flag only a dry-run
    /// preview is printed
    #[arg(long)]
    pub confirm: bool,
}

/// Arguments for the status command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct StatusArgs {
    /// Logical model name; omit to list every model
    #[arg(value_name = "MODEL")]
    pub model: Option<String>,
}

/// Arguments for the history command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct HistoryArgs {
    /// Logical model name
    #[arg(value_name = "MODEL")]
    pub model: String,
}
