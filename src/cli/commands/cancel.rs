//! Cancel command implementation

use super::{CliError, CommandContext};
use crate::cli::logging::log;
use crate::cli::{CancelArgs, LogLevel};
use crate::deploy::DeploymentController;

pub fn run_cancel(args: &CancelArgs, ctx: &CommandContext, level: LogLevel) -> Result<(), CliError> {
    let controller = DeploymentController::new(&ctx.registry);
    let artifact = controller
        .cancel(&args.model, args.version, args.archive)
        .map_err(|e| CliError::failure(format!("Cancellation failed: {e}")))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "{} v{} withdrawn from staging ({})",
            artifact.model_name, artifact.version, artifact.stage
        ),
    );
    Ok(())
}
