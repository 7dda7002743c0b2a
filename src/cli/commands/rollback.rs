//! Rollback command implementation
//!
//! Exit status is three-way: 0 for a committed swap or a dry-run preview,
//! 1 for failures, 2 when the target is already live (rejected no-op).

use super::{CliError, CommandContext};
use crate::cli::logging::log;
use crate::cli::{LogLevel, RollbackArgs};
use crate::rollback::{RollbackError, RollbackExecutor, RollbackOutcome};

pub fn run_rollback(
    args: &RollbackArgs,
    ctx: &CommandContext,
    level: LogLevel,
) -> Result<(), CliError> {
    let executor = RollbackExecutor::new(&ctx.registry);
    let outcome = executor
        .rollback(&args.model, args.version, args.confirm)
        .map_err(|e| match e {
            RollbackError::NoOpRollback { .. } => CliError::no_op(format!("Nothing to do: {e}")),
            RollbackError::UnhealthyTarget { .. } => {
                CliError::failure(format!("Rollback refused: {e}"))
            }
            other => CliError::failure(format!("Rollback failed: {other}")),
        })?;

    match outcome {
        RollbackOutcome::DryRun(plan) => {
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "Dry run: would restore {} v{} (currently {}) to production{}",
                    plan.model_name,
                    plan.target_version,
                    plan.target_stage,
                    plan.displaced_version
                        .map_or_else(String::new, |v| format!(", displacing v{v}")),
                ),
            );
            log(level, LogLevel::Normal, "Re-run with --confirm to apply");
        }
        RollbackOutcome::Committed(receipt) => {
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "Rolled back {}: v{} is now production{}",
                    receipt.model_name,
                    receipt.restored_version,
                    receipt
                        .displaced_version
                        .map_or_else(String::new, |v| format!(" (v{v} archived)")),
                ),
            );
        }
    }
    Ok(())
}
