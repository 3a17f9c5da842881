//! YAML configuration loading and parsing

use crate::error::CiError;
use crate::system::System;
use anyhow::{Context as _, Result};
use serde_json::Value;
use std::path::Path;

/// Load a configuration document from file as a generic value tree
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The file is not valid YAML
pub fn load_document(system: &dyn System, path: &Path) -> Result<Value> {
    if !system.exists(path) {
        return Err(CiError::schema(format!(
            "Configuration file not found: {}",
            path.display()
        ))
        .into());
    }

    let content = system
        .read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

    parse_document(&content).with_context(|| {
        format!(
            "Failed to parse YAML configuration in file: {}",
            path.display()
        )
    })
}

/// Parse YAML text into a generic value tree
///
/// # Errors
///
/// Returns an error if the text is not valid YAML or uses non-string mapping keys
pub fn parse_document(content: &str) -> Result<Value> {
    serde_yaml::from_str(content).map_err(|e| CiError::schema(format!("Invalid YAML: {e}")).into())
}
