//! Configuration management module
//!
//! Handles YAML configuration parsing, JSON schema validation, semantic
//! validation and wildcard expansion of image entries

pub mod auth;
pub mod pro;
pub mod schema;
pub mod validation;
pub mod yaml;

use crate::metadata::Workspace;
use auth::RegistryAuth;
use pro::ProService;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// The only supported configuration version
pub const SUPPORTED_VERSION: i64 = 1;

/// Directory value that expands to every image in the repository
pub const WILDCARD: &str = "*";

/// GitHub Container Registry publishing flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GhcrConfig {
    pub upload: bool,
    #[serde(rename = "cve-scan")]
    pub cve_scan: bool,
}

/// A registry images can be published to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub uri: String,
    pub auth: RegistryAuth,
}

/// One image to build, after validation and wildcard expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Directory containing the `rockcraft.yaml`, relative to the repository root
    pub directory: String,

    pub pro_services: BTreeSet<ProService>,

    /// Names of entries in [`CiConfig::registries`]
    pub registries: BTreeSet<String>,

    /// Base used for the tag when the rock declares a `bare` base
    pub base_override: Option<String>,

    pub lfs: bool,

    pub lfs_include: Vec<String>,
}

impl ImageEntry {
    /// Create an entry with no Pro services, registries or extensions
    #[must_use]
    pub fn new<S: Into<String>>(directory: S) -> Self {
        Self {
            directory: directory.into(),
            pro_services: BTreeSet::new(),
            registries: BTreeSet::new(),
            base_override: None,
            lfs: false,
            lfs_include: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_pro_services<I: IntoIterator<Item = ProService>>(mut self, services: I) -> Self {
        self.pro_services = services.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_registries<I, S>(mut self, registries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registries = registries.into_iter().map(Into::into).collect();
        self
    }
}

/// Validated CI configuration
///
/// Constructed once from the input document and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiConfig {
    pub version: i64,
    pub ghcr: GhcrConfig,
    pub registries: BTreeMap<String, RegistryEntry>,
    pub images: Vec<ImageEntry>,
}

impl CiConfig {
    /// Load and validate configuration from file
    ///
    /// Wildcard directories are expanded against `workspace`.
    pub fn load_from_file(workspace: &Workspace<'_>, path: &Path) -> anyhow::Result<Self> {
        let document = yaml::load_document(workspace.system(), path)?;
        Self::from_value(document, workspace)
    }

    /// Validate configuration from YAML text
    pub fn from_yaml_str(content: &str, workspace: &Workspace<'_>) -> anyhow::Result<Self> {
        let document = yaml::parse_document(content)?;
        Self::from_value(document, workspace)
    }

    /// Validate an already parsed document
    ///
    /// # Errors
    ///
    /// Returns the first violation found; see [`validation::validate_config`]
    pub fn from_value(document: Value, workspace: &Workspace<'_>) -> anyhow::Result<Self> {
        schema::validate_against_schema(&document)?;
        validation::validate_config(document, workspace)
    }
}
