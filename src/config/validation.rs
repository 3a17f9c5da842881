//! Configuration validation logic
//!
//! Runs after the structural schema check. Rules are applied in order and the
//! first violation aborts validation; wildcard directories are expanded only
//! once every entry has passed.

use crate::config::auth::RegistryAuth;
use crate::config::pro::ProService;
use crate::config::{
    CiConfig, GhcrConfig, ImageEntry, RegistryEntry, SUPPORTED_VERSION, WILDCARD,
};
use crate::error::CiError;
use crate::metadata::Workspace;
use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    version: i64,
    ghcr: GhcrConfig,
    registries: Option<BTreeMap<String, RawRegistry>>,
    images: Option<Vec<RawImage>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegistry {
    uri: String,
    auth: Vec<RawAuth>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAuth {
    method: String,
    config: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawImage {
    directory: String,
    #[serde(default)]
    pro_services: Option<Vec<String>>,
    #[serde(default)]
    registries: Option<Vec<String>>,
    #[serde(default)]
    base_override: Option<String>,
    #[serde(default)]
    lfs: bool,
    #[serde(default)]
    lfs_include: Option<Vec<String>>,
}

/// Validate a document that already matches the schema
///
/// # Errors
///
/// Returns an error if:
/// - `version` is not the supported version
/// - `ghcr.cve-scan` is enabled while `ghcr.upload` is not
/// - A registry does not declare exactly one valid auth entry
/// - An image directory embeds the wildcard in a longer path
/// - An image lists an unknown Pro service
/// - An image references a registry that is not declared
/// - Wildcard discovery fails
pub fn validate_config(document: Value, workspace: &Workspace<'_>) -> Result<CiConfig> {
    let raw: RawConfig = serde_json::from_value(document)
        .map_err(|e| CiError::schema(format!("Invalid configuration: {e}")))?;

    validate_version(raw.version)?;
    validate_ghcr(&raw.ghcr)?;

    let mut registries = BTreeMap::new();
    for (name, registry) in raw.registries.unwrap_or_default() {
        let entry = validate_registry(&name, registry)?;
        registries.insert(name, entry);
    }

    let mut images = Vec::new();
    for (index, image) in raw.images.unwrap_or_default().into_iter().enumerate() {
        images.push(validate_image(index, image)?);
    }

    validate_registry_references(&images, &registries)?;

    let images = expand_wildcards(images, workspace)?;
    debug!(
        "Validated configuration with {} registries and {} images",
        registries.len(),
        images.len()
    );

    Ok(CiConfig {
        version: raw.version,
        ghcr: raw.ghcr,
        registries,
        images,
    })
}

/// Validate the configuration version
///
/// # Errors
///
/// Returns a schema error for any version other than the supported one
#[inline]
pub fn validate_version(version: i64) -> Result<()> {
    if version != SUPPORTED_VERSION {
        return Err(CiError::schema(format!(
            "version: unsupported version {version}. Only version {SUPPORTED_VERSION} of the CI configuration is supported."
        ))
        .into());
    }
    Ok(())
}

/// Validate GHCR flags
///
/// # Errors
///
/// Returns a schema error when CVE scanning is requested without upload
#[inline]
pub fn validate_ghcr(ghcr: &GhcrConfig) -> Result<()> {
    if ghcr.cve_scan && !ghcr.upload {
        return Err(
            CiError::schema("ghcr.cve-scan: cve-scan can not be true if upload is false").into(),
        );
    }
    Ok(())
}

fn validate_registry(name: &str, registry: RawRegistry) -> Result<RegistryEntry> {
    let path = format!("registries.{name}.auth");

    let mut auth_entries = registry.auth.into_iter();
    let (Some(auth), None) = (auth_entries.next(), auth_entries.next()) else {
        return Err(
            CiError::schema(format!("{path}: Auth list must contain exactly one entry.")).into(),
        );
    };

    Ok(RegistryEntry {
        uri: registry.uri,
        auth: RegistryAuth::resolve(&path, &auth.method, auth.config)?,
    })
}

fn validate_image(index: usize, image: RawImage) -> Result<ImageEntry> {
    validate_directory(&image.directory)
        .map_err(|e| CiError::format(format!("images[{index}].directory: {}", e.message())))?;

    let mut pro_services = BTreeSet::new();
    for service in image.pro_services.unwrap_or_default() {
        let service: ProService = service.parse().map_err(|e: CiError| {
            CiError::reference(format!("images[{index}].pro-services: {}", e.message()))
        })?;
        pro_services.insert(service);
    }

    Ok(ImageEntry {
        directory: image.directory,
        pro_services,
        registries: image.registries.unwrap_or_default().into_iter().collect(),
        base_override: image.base_override,
        lfs: image.lfs,
        lfs_include: image.lfs_include.unwrap_or_default(),
    })
}

/// Validate an image directory
///
/// The wildcard is only accepted on its own; it may not appear inside a path.
///
/// # Errors
///
/// Returns a format error for empty directories and embedded wildcards
#[inline]
pub fn validate_directory(directory: &str) -> Result<(), CiError> {
    if directory.trim().is_empty() {
        return Err(CiError::format("Directory cannot be empty"));
    }

    if directory.contains(WILDCARD) && directory != WILDCARD {
        return Err(CiError::format(format!(
            "Wildcard '{WILDCARD}' must be the only character in directory, got '{directory}'"
        )));
    }

    Ok(())
}

/// Check that every registry referenced by an image is declared
///
/// # Errors
///
/// Returns a reference error naming the first undeclared registry and its image
pub fn validate_registry_references(
    images: &[ImageEntry],
    registries: &BTreeMap<String, RegistryEntry>,
) -> Result<()> {
    for image in images {
        if let Some(missing) = image
            .registries
            .iter()
            .find(|registry| !registries.contains_key(*registry))
        {
            return Err(CiError::reference(format!(
                "Registry '{missing}' in image '{}' is not defined in registries.",
                image.directory
            ))
            .into());
        }
    }
    Ok(())
}

/// Replace wildcard entries with one entry per discovered image directory
///
/// Expanded entries inherit every other field of the wildcard entry.
///
/// # Errors
///
/// Returns an error if directory discovery fails
pub fn expand_wildcards(
    images: Vec<ImageEntry>,
    workspace: &Workspace<'_>,
) -> Result<Vec<ImageEntry>> {
    let mut discovered: Option<Vec<String>> = None;
    let mut expanded = Vec::with_capacity(images.len());

    for image in images {
        if image.directory != WILDCARD {
            expanded.push(image);
            continue;
        }

        if discovered.is_none() {
            discovered = Some(workspace.discover_image_directories()?);
        }
        let directories = discovered.as_deref().unwrap_or_default();
        debug!("Expanding wildcard into {} image directories", directories.len());

        for directory in directories {
            expanded.push(ImageEntry {
                directory: directory.clone(),
                ..image.clone()
            });
        }
    }

    Ok(expanded)
}
