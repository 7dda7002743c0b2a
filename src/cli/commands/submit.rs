//! Submit command implementation

use std::sync::Arc;

use super::{params_or_default, read_series, CliError, CommandContext};
use crate::cli::logging::log;
use crate::cli::{LogLevel, SubmitArgs};
use crate::lifecycle::LifecyclePipeline;

pub fn run_submit(args: &SubmitArgs, ctx: &CommandContext, level: LogLevel) -> Result<(), CliError> {
    let predictions = read_series(&args.predictions_file)?;
    let actuals = read_series(&args.actuals_file)?;
    let params = params_or_default(args.params_file.as_deref())?;

    let pipeline = LifecyclePipeline::new(&ctx.registry, ctx.config.thresholds)
        .with_audit(Arc::clone(&ctx.audit));
    let outcome = pipeline
        .submit_candidate(&args.model, &args.artifact_uri, &predictions, &actuals, &params)
        .map_err(|e| CliError::failure(format!("Submission failed: {e}")))?;

    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Candidate RMSE: {:.4}, baseline RMSE: {}",
            outcome.decision.candidate_rmse,
            outcome
                .decision
                .baseline_rmse
                .map_or_else(|| "none".to_string(), |r| format!("{r:.4}")),
        ),
    );

    match outcome.artifact {
        Some(artifact) => {
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "Candidate approved ({}): registered {} v{}, now staging",
                    outcome.decision.reason, artifact.model_name, artifact.version
                ),
            );
        }
        None => {
            log(
                level,
                LogLevel::Normal,
                &format!("Candidate rejected ({}); nothing registered", outcome.decision.reason),
            );
        }
    }
    Ok(())
}
