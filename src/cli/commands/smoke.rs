//! Smoke command implementation

use super::{CliError, CommandContext};
use crate::cli::logging::log;
use crate::cli::{LogLevel, SmokeArgs, SmokeOutcome};
use crate::deploy::DeploymentController;
use crate::registry::GateStatus;

pub fn run_smoke(args: &SmokeArgs, ctx: &CommandContext, level: LogLevel) -> Result<(), CliError> {
    let controller = DeploymentController::new(&ctx.registry);
    let passed = args.outcome == SmokeOutcome::Pass;
    let status = controller
        .record_smoke_test(&args.model, args.version, passed)
        .map_err(|e| CliError::failure(format!("Cannot record smoke test: {e}")))?;

    let message = match status {
        GateStatus::AwaitingApproval => {
            format!("{} v{}: smoke test passed; awaiting approval", args.model, args.version)
        }
        _ => format!(
            "{} v{}: smoke test failure recorded; version remains staged",
            args.model, args.version
        ),
    };
    log(level, LogLevel::Normal, &message);
    Ok(())
}
