use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for rockmatrix
#[derive(Parser, Debug, Clone)]
#[command(name = "rockmatrix")]
#[command(about = "Validate a rock CI configuration and generate build and upload matrices")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Path to the CI configuration YAML
    #[arg(value_name = "CONFIG")]
    pub config_path: PathBuf,

    /// Path to the repository root that image directories are relative to
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub repo_root: PathBuf,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}
