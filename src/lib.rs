//! `rockmatrix` - validate a rock CI configuration and expand it into job matrices
//!
//! The configuration lists the rocks to build, the Ubuntu Pro services to
//! build them with and the registries to publish them to. This library
//! validates it and derives a build matrix (one row per image and Pro service
//! set) and an upload matrix (one row per image, Pro service set and registry).

pub mod cli;
pub mod config;
pub mod error;
pub mod matrix;
pub mod metadata;
pub mod output;
pub mod system;

use anyhow::Result;
use cli::Args;
use config::CiConfig;
use metadata::Workspace;
use output::{OutputTarget, StepOutputs};
use system::System;
use tracing::info;

/// Compute every step output for a configuration file
///
/// # Errors
///
/// Returns the first validation, metadata or collision error encountered
pub fn generate_outputs(args: &Args, system: &dyn System) -> Result<StepOutputs> {
    let workspace = Workspace::new(system, &args.repo_root);
    let config = CiConfig::load_from_file(&workspace, &args.config_path)?;
    info!(
        "Loaded {} images and {} registries from {}",
        config.images.len(),
        config.registries.len(),
        args.config_path.display()
    );

    let build_matrix = matrix::build_matrix(&config, &workspace)?;
    let upload_matrix = matrix::upload_matrix(&config, &workspace)?;
    info!(
        "Generated {} build jobs and {} upload jobs",
        build_matrix.include.len(),
        upload_matrix.include.len()
    );

    let mut outputs = StepOutputs::new();
    outputs.push("ghcr-upload", &config.ghcr.upload)?;
    outputs.push("ghcr-cve-scan", &config.ghcr.cve_scan)?;
    outputs.push("build-matrix", &build_matrix)?;
    outputs.push("upload-matrix", &upload_matrix)?;
    Ok(outputs)
}

/// Main entry point for the rockmatrix library
pub fn run(args: &Args, system: &dyn System) -> Result<()> {
    let outputs = generate_outputs(args, system)?;
    outputs.write(system, &OutputTarget::from_env(system))
}
