//! Approve command implementation

use super::{CliError, CommandContext};
use crate::cli::logging::log;
use crate::cli::{ApproveArgs, LogLevel};
use crate::deploy::DeploymentController;

pub fn run_approve(
    args: &ApproveArgs,
    ctx: &CommandContext,
    level: LogLevel,
) -> Result<(), CliError> {
    let controller = DeploymentController::new(&ctx.registry);
    let artifact = controller
        .record_approval(&args.model, args.version, &args.approver)
        .map_err(|e| CliError::failure(format!("Approval refused: {e}")))?;

    log(
        level,
        LogLevel::Normal,
        &format!("{} v{} promoted to production", artifact.model_name, artifact.version),
    );
    Ok(())
}
