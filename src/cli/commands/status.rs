//! Status command implementation

use super::{CliError, CommandContext};
use crate::cli::logging::log;
use crate::cli::{LogLevel, StatusArgs};
use crate::registry::RegistryState;

/// One-line deployment summary for a model.
fn summary_line(state: &RegistryState) -> String {
    let production = state
        .production_version
        .map_or_else(|| "none".to_string(), |v| format!("v{v}"));
    let staging =
        state.staging_version.map_or_else(|| "none".to_string(), |v| format!("v{v}"));
    format!(
        "{}: {} versions, production {}, staging {}",
        state.model_name,
        state.artifacts.len(),
        production,
        staging
    )
}

pub fn run_status(args: &StatusArgs, ctx: &CommandContext, level: LogLevel) -> Result<(), CliError> {
    match &args.model {
        Some(model) => {
            let state = ctx
                .registry
                .snapshot(model)
                .map_err(|e| CliError::failure(format!("Status unavailable: {e}")))?;
            log(level, LogLevel::Normal, &summary_line(&state));
            for (version, gate) in &state.gates {
                log(level, LogLevel::Normal, &format!("  v{version}: {gate}"));
            }
        }
        None => {
            let models = ctx
                .registry
                .list_models()
                .map_err(|e| CliError::failure(format!("Status unavailable: {e}")))?;
            if models.is_empty() {
                log(level, LogLevel::Normal, "No models registered");
                return Ok(());
            }
            for model in models {
                let state = ctx
                    .registry
                    .snapshot(&model)
                    .map_err(|e| CliError::failure(format!("Status unavailable: {e}")))?;
                log(level, LogLevel::Normal, &summary_line(&state));
            }
        }
    }
    Ok(())
}
