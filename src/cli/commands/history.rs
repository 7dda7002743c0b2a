//! History command implementation

use super::{CliError, CommandContext};
use crate::cli::logging::log;
use crate::cli::{HistoryArgs, LogLevel};

pub fn run_history(
    args: &HistoryArgs,
    ctx: &CommandContext,
    level: LogLevel,
) -> Result<(), CliError> {
    let versions = ctx
        .registry
        .list_versions(&args.model)
        .map_err(|e| CliError::failure(format!("History unavailable: {e}")))?;
    if versions.is_empty() {
        return Err(CliError::failure(format!("History unavailable: unknown model: {}", args.model)));
    }

    log(level, LogLevel::Normal, &format!("Versions of {}:", args.model));
    for artifact in &versions {
        let rmse = artifact
            .metrics
            .get("rmse")
            .map_or_else(|| "-".to_string(), |r| format!("{r:.4}"));
        log(
            level,
            LogLevel::Normal,
            &format!(
                "  v{:<4} {:<11} rmse {:<10} registered {}",
                artifact.version,
                artifact.stage.as_str(),
                rmse,
                artifact.created_at.format("%Y-%m-%d %H:%M:%S"),
            ),
        );
    }

    let transitions = ctx
        .registry
        .transition_history(&args.model)
        .map_err(|e| CliError::failure(format!("History unavailable: {e}")))?;
    log(level, LogLevel::Verbose, "Stage transitions:");
    for t in &transitions {
        let from = t.from.map_or_else(|| "-".to_string(), |s| s.to_string());
        let reason = t.reason.as_deref().unwrap_or("");
        log(
            level,
            LogLevel::Verbose,
            &format!(
                "  {} v{}: {} -> {} {}",
                t.at.format("%Y-%m-%d %H:%M:%S"),
                t.version,
                from,
                t.to,
                reason
            ),
        );
    }
    Ok(())
}
