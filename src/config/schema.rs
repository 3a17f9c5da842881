//! JSON Schema validation for the CI configuration document
//!
//! The schema is closed: unknown keys at any level are rejected. It only
//! covers the structure of the document; semantic rules live in
//! [`crate::config::validation`].

use crate::error::CiError;
use anyhow::{Result, anyhow};
use jsonschema::Validator;
use serde_json::Value;

/// Get the embedded JSON schema for the CI configuration
pub fn get_schema() -> Result<Validator> {
    let schema_str = include_str!("../../docs/schema.json");
    let schema: Value = serde_json::from_str(schema_str)
        .map_err(|e| anyhow!("Failed to parse embedded JSON schema: {e}"))?;

    jsonschema::draft7::new(&schema).map_err(|e| anyhow!("Failed to compile JSON schema: {e}"))
}

/// Validate a configuration document against the schema
///
/// # Errors
///
/// Returns a schema error listing every violation with its field path
pub fn validate_against_schema(document: &Value) -> Result<()> {
    let schema = get_schema()?;

    let error_messages: Vec<String> = schema
        .iter_errors(document)
        .map(|e| {
            format!(
                "  - Path '{}': {}",
                dotted_path(&e.instance_path.to_string()),
                e
            )
        })
        .collect();

    if !error_messages.is_empty() {
        return Err(CiError::schema(format!(
            "Configuration validation failed:\n{}",
            error_messages.join("\n")
        ))
        .into());
    }

    Ok(())
}

/// Render a JSON pointer as a dotted field path (`/images/0/directory` -> `images[0].directory`)
#[must_use]
pub fn dotted_path(pointer: &str) -> String {
    let mut path = String::new();
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&segment);
        }
    }

    if path.is_empty() {
        return "<root>".to_owned();
    }
    path
}
