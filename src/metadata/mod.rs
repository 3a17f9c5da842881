//! Per-image metadata read from the repository
//!
//! All lookups resolve image directories against an explicit repository root;
//! nothing depends on the process working directory.

use crate::error::CiError;
use crate::system::System;
use anyhow::Result;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Metadata file that marks an image directory
pub const METADATA_FILE: &str = "rockcraft.yaml";

/// Test specification whose presence enables tests for an image
pub const TEST_SPEC_FILE: &str = "spread.yaml";

/// Fields of `rockcraft.yaml` used to name and tag an image
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageMetadata {
    pub name: String,

    /// Kept as written; `1.0` stays `1.0`
    pub version: String,

    pub base: String,

    #[serde(default, rename = "build-base")]
    pub build_base: Option<String>,
}

/// Repository the configuration's image directories are relative to
pub struct Workspace<'a> {
    system: &'a dyn System,
    root: PathBuf,
}

impl<'a> Workspace<'a> {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(system: &'a dyn System, root: P) -> Self {
        Self {
            system,
            root: root.into(),
        }
    }

    #[must_use]
    pub fn system(&self) -> &'a dyn System {
        self.system
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn metadata_path(&self, directory: &str) -> PathBuf {
        self.root.join(directory).join(METADATA_FILE)
    }

    /// Read the metadata of the image in `directory`
    ///
    /// # Errors
    ///
    /// Returns a metadata error if the file is missing, unreadable or lacks
    /// one of the required fields
    pub fn image_metadata(&self, directory: &str) -> Result<ImageMetadata> {
        let path = self.metadata_path(directory);
        let display = format!("{directory}/{METADATA_FILE}");

        if !self.system.is_file(&path) {
            return Err(CiError::metadata(format!(
                "Metadata file '{display}' not found under '{}'",
                self.root.display()
            ))
            .into());
        }

        let content = self
            .system
            .read_to_string(&path)
            .map_err(|e| CiError::metadata(format!("Failed to read '{display}': {e}")))?;

        serde_yaml::from_str(&content)
            .map_err(|e| CiError::metadata(format!("Failed to parse '{display}': {e}")).into())
    }

    /// Whether the image in `directory` ships a test specification
    #[must_use]
    pub fn has_test_spec(&self, directory: &str) -> bool {
        self.system
            .is_file(&self.root.join(directory).join(TEST_SPEC_FILE))
    }

    /// List every directory below the root that contains a metadata file
    ///
    /// Directories are relative to the root, `/`-separated and sorted. Hidden
    /// directories and the root itself are skipped.
    ///
    /// # Errors
    ///
    /// Returns a metadata error if the root cannot be walked
    pub fn discover_image_directories(&self) -> Result<Vec<String>> {
        let entries = self.system.walk_dir(&self.root).map_err(|e| {
            CiError::metadata(format!(
                "Failed to search '{}' for {METADATA_FILE} files: {e}",
                self.root.display()
            ))
        })?;

        let mut directories: Vec<String> = entries
            .into_iter()
            .filter(|entry| entry.is_file && entry.path.file_name() == Some(OsStr::new(METADATA_FILE)))
            .filter_map(|entry| {
                let relative = entry.path.parent()?.strip_prefix(&self.root).ok()?;
                relative_directory(relative)
            })
            .collect();

        directories.sort();
        directories.dedup();
        Ok(directories)
    }
}

fn relative_directory(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                if part.starts_with('.') {
                    return None;
                }
                parts.push(part.into_owned());
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_directory() {
        assert_eq!(
            relative_directory(Path::new("mock-rock/1.0")),
            Some("mock-rock/1.0".to_owned())
        );
        assert_eq!(
            relative_directory(Path::new("./mock-rock")),
            Some("mock-rock".to_owned())
        );
        assert_eq!(relative_directory(Path::new("")), None);
        assert_eq!(relative_directory(Path::new(".github/rock")), None);
    }
}
