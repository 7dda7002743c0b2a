//! Stage command implementation

use super::{CliError, CommandContext};
use crate::cli::logging::log;
use crate::cli::{LogLevel, StageArgs};
use crate::deploy::DeploymentController;

pub fn run_stage(args: &StageArgs, ctx: &CommandContext, level: LogLevel) -> Result<(), CliError> {
    let controller = DeploymentController::new(&ctx.registry);
    let artifact = controller
        .begin_staging(&args.model, args.version)
        .map_err(|e| CliError::failure(format!("Staging failed: {e}")))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "{} v{} deployed to staging; awaiting smoke test",
            artifact.model_name, artifact.version
        ),
    );
    Ok(())
}
