//! Promover CLI
//!
//! Operator control surface for the model lifecycle.
//!
//! # Usage
//!
//! ```bash
//! # Register a trained artifact with its held-out metrics
//! promover register sales-forecaster --artifact-uri s3://models/run-7 \
//!     --metrics-file metrics.json --params-file params.yaml
//!
//! # Evaluate a candidate and stage it if the promotion gate approves
//! promover submit sales-forecaster --artifact-uri s3://models/run-8 \
//!     --predictions-file preds.json --actuals-file actuals.json
//!
//! # Staged rollout
//! promover stage sales-forecaster --version 3
//! promover smoke sales-forecaster --version 3 --outcome pass
//! promover approve sales-forecaster --version 3 --approver ops@example.com
//!
//! # Emergency rollback (dry run without --confirm)
//! promover rollback sales-forecaster --version 2 --confirm
//! ```
//!
//! Exit codes: 0 success (including dry runs), 1 failure, 2 rejected no-op.

use clap::Parser;
use promover::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.message);
            ExitCode::from(e.code)
        }
    }
}
