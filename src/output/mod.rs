//! Step outputs in `key=value` form
//!
//! Values are JSON encoded. When `GITHUB_OUTPUT` names a file the outputs are
//! appended to it compactly, one per line; otherwise they are printed to
//! stdout with indentation for reading.

use crate::error::CiError;
use crate::system::System;
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

/// Environment variable naming the output file
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Where outputs end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

impl OutputTarget {
    /// Resolve the target from the environment
    #[must_use]
    pub fn from_env(system: &dyn System) -> Self {
        match system.env_var(GITHUB_OUTPUT_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::File(PathBuf::from(path)),
            _ => Self::Stdout,
        }
    }
}

/// Ordered collection of named output values
#[derive(Debug, Clone, Default)]
pub struct StepOutputs {
    entries: Vec<(String, Value)>,
}

impl StepOutputs {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an output
    ///
    /// # Errors
    ///
    /// Returns an output error if the value cannot be encoded as JSON
    pub fn push<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| CiError::output(format!("Failed to encode output '{key}': {e}")))?;
        self.entries.push((key.to_owned(), value));
        Ok(())
    }

    /// Render every output as `key=json` lines
    ///
    /// # Errors
    ///
    /// Returns an output error if a value cannot be encoded
    pub fn render(&self, pretty: bool) -> Result<String> {
        let mut rendered = String::new();
        for (key, value) in &self.entries {
            let json = if pretty {
                serde_json::to_string_pretty(value)
            } else {
                serde_json::to_string(value)
            }
            .map_err(|e| CiError::output(format!("Failed to encode output '{key}': {e}")))?;
            rendered.push_str(key);
            rendered.push('=');
            rendered.push_str(&json);
            rendered.push('\n');
        }
        Ok(rendered)
    }

    /// Write the outputs to `target`
    ///
    /// # Errors
    ///
    /// Returns an output error if the output file cannot be written
    pub fn write(&self, system: &dyn System, target: &OutputTarget) -> Result<()> {
        match target {
            OutputTarget::File(path) => {
                info!("Exporting config to {}", path.display());
                let rendered = self.render(false)?;
                system.append(path, rendered.as_bytes()).map_err(|e| {
                    CiError::output(format!("Failed to write outputs to {}: {e}", path.display()))
                })?;
            }
            OutputTarget::Stdout => {
                info!("Exporting config to stdout");
                print!("{}", self.render(true)?);
            }
        }
        Ok(())
    }
}
