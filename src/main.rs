//! # `rockmatrix`
//!
//! `rockmatrix` validates the CI configuration of a rocks repository and
//! writes the build and upload matrices consumed by the CI workflow.
//!
//! ## Usage
//!
//! ```sh
//! rockmatrix ci.yaml --repo-root .
//! ```
//!
//! Outputs are appended to the file named by `GITHUB_OUTPUT`, or printed to
//! stdout when it is not set.

use clap::Parser as _;
use rockmatrix::cli::Args;
use rockmatrix::error::CiError;
use rockmatrix::system::real::RealSystem;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout may carry the outputs
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let system = RealSystem::new();
    match rockmatrix::run(&args, &system) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<CiError>()
                    .map_or(1, CiError::exit_code),
            );
        }
    }
}
