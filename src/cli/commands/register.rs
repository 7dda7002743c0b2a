//! Register command implementation

use super::{params_or_default, read_metric_map, CliError, CommandContext};
use crate::cli::logging::log;
use crate::cli::{LogLevel, RegisterArgs};

pub fn run_register(
    args: &RegisterArgs,
    ctx: &CommandContext,
    level: LogLevel,
) -> Result<(), CliError> {
    let metrics = read_metric_map(&args.metrics_file)?;
    let params = params_or_default(args.params_file.as_deref())?;

    let artifact = ctx
        .registry
        .register(&args.model, &args.artifact_uri, metrics, &params)
        .map_err(|e| CliError::failure(format!("Registration failed: {e}")))?;

    log(
        level,
        LogLevel::Normal,
        &format!("Registered {} v{} ({})", artifact.model_name, artifact.version, artifact.stage),
    );
    log(level, LogLevel::Verbose, &format!("  Artifact URI: {}", artifact.artifact_uri));
    log(level, LogLevel::Verbose, &format!("  Fingerprint:  {}", artifact.fingerprint));
    Ok(())
}
