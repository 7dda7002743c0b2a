//! CLI command implementations

mod approve;
mod cancel;
mod history;
mod register;
mod rollback;
mod smoke;
mod stage;
mod status;
mod submit;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::audit::{AuditSink, JsonlAuditSink, NullAuditSink};
use crate::cli::logging::LogLevel;
use crate::cli::{Cli, Command};
use crate::config::{load_lifecycle_config, load_params, ForecasterParams, LifecycleConfig};
use crate::registry::store::JsonFileStore;
use crate::registry::Registry;

/// Operator-facing failure: a human-readable message plus the process exit
/// code (1 for failures, 2 for rejected no-ops).
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub code: u8,
}

impl CliError {
    pub(crate) fn failure(message: impl Into<String>) -> Self {
        Self { message: message.into(), code: 1 }
    }

    pub(crate) fn no_op(message: impl Into<String>) -> Self {
        Self { message: message.into(), code: 2 }
    }
}

/// Shared handles every command works through.
pub(crate) struct CommandContext {
    pub config: LifecycleConfig,
    pub audit: Arc<dyn AuditSink>,
    pub registry: Registry<JsonFileStore>,
}

impl CommandContext {
    fn open(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => load_lifecycle_config(path)
                .map_err(|e| CliError::failure(format!("Config error: {e}")))?,
            None => LifecycleConfig::default(),
        };
        let audit: Arc<dyn AuditSink> = match &config.audit_log {
            Some(path) => Arc::new(
                JsonlAuditSink::open(path)
                    .map_err(|e| CliError::failure(format!("Cannot open audit log: {e}")))?,
            ),
            None => Arc::new(NullAuditSink),
        };
        let registry = Registry::new(JsonFileStore::new(&config.registry_dir))
            .with_audit(Arc::clone(&audit))
            .with_lock_wait(config.lock_wait());
        Ok(Self { config, audit, registry })
    }
}

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), CliError> {
    // Configure output based on verbose/quiet flags
    let log_level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    };

    let ctx = CommandContext::open(cli.config.as_deref())?;

    match cli.command {
        Command::Register(args) => register::run_register(&args, &ctx, log_level),
        Command::Submit(args) => submit::run_submit(&args, &ctx, log_level),
        Command::Stage(args) => stage::run_stage(&args, &ctx, log_level),
        Command::Smoke(args) => smoke::run_smoke(&args, &ctx, log_level),
        Command::Approve(args) => approve::run_approve(&args, &ctx, log_level),
        Command::Cancel(args) => cancel::run_cancel(&args, &ctx, log_level),
        Command::Rollback(args) => rollback::run_rollback(&args, &ctx, log_level),
        Command::Status(args) => status::run_status(&args, &ctx, log_level),
        Command::History(args) => history::run_history(&args, &ctx, log_level),
    }
}

/// Load hyperparameters from the optional file, falling back to defaults.
pub(crate) fn params_or_default(path: Option<&Path>) -> Result<ForecasterParams, CliError> {
    match path {
        Some(path) => {
            load_params(path).map_err(|e| CliError::failure(format!("Hyperparameter error: {e}")))
        }
        None => Ok(ForecasterParams::default()),
    }
}

/// Read a JSON object mapping metric names to values.
pub(crate) fn read_metric_map(path: &Path) -> Result<BTreeMap<String, f64>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::failure(format!("Cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::failure(format!("Cannot parse {}: {e}", path.display())))
}

/// Read a JSON array of floats.
pub(crate) fn read_series(path: &Path) -> Result<Vec<f64>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::failure(format!("Cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::failure(format!("Cannot parse {}: {e}", path.display())))
}
