//! Build and upload matrix generation
//!
//! Images are grouped by `(directory, pro-services)`. Repeated declarations of
//! the same pair collapse into one group whose registries are the union of
//! every declaration. Groups keep the order of their first declaration.

pub mod tag;

use crate::config::pro::{ProService, join_services};
use crate::config::{CiConfig, ImageEntry};
use crate::error::CiError;
use crate::metadata::Workspace;
use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

pub use tag::image_name_and_tag;

/// Rows in the shape a CI fan-out job expects (`{"include": [...]}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matrix<T> {
    pub include: Vec<T>,
}

impl<T> Default for Matrix<T> {
    fn default() -> Self {
        Self {
            include: Vec::new(),
        }
    }
}

/// One build job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildRow {
    pub name: String,
    pub tag: String,
    pub directory: String,
    /// Sorted, comma-joined
    pub pro_services: String,
    pub artifact_name: String,
    pub run_tests: bool,
    pub lfs: bool,
    /// Comma-joined
    pub lfs_include: String,
}

/// One upload job: an artifact published to one registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct UploadRow {
    pub name: String,
    pub tag: String,
    pub artifact_name: String,
    pub pro_enabled: bool,
    pub registry_uri: String,
    /// `registry-auth-*` fields, including `registry-auth-method`
    #[serde(flatten)]
    pub auth: BTreeMap<String, String>,
}

/// Merged declarations of one `(directory, pro-services)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGroup {
    pub directory: String,
    pub pro_services: BTreeSet<ProService>,
    pub registries: BTreeSet<String>,
    pub base_override: Option<String>,
    pub lfs: bool,
    pub lfs_include: Vec<String>,
    pub artifact_name: String,
}

impl ImageGroup {
    fn new(image: &ImageEntry) -> Self {
        Self {
            directory: image.directory.clone(),
            pro_services: image.pro_services.clone(),
            registries: BTreeSet::new(),
            base_override: None,
            lfs: false,
            lfs_include: Vec::new(),
            artifact_name: artifact_name(&image.directory, &image.pro_services),
        }
    }

    fn merge(&mut self, image: &ImageEntry) -> Result<()> {
        self.registries.extend(image.registries.iter().cloned());
        self.lfs |= image.lfs;
        for pattern in &image.lfs_include {
            if !self.lfs_include.contains(pattern) {
                self.lfs_include.push(pattern.clone());
            }
        }

        match (self.base_override.as_deref(), image.base_override.as_deref()) {
            (Some(current), Some(other)) if current != other => {
                return Err(CiError::schema(format!(
                    "Conflicting base-override values '{current}' and '{other}' for image '{}'",
                    self.directory
                ))
                .into());
            }
            (None, Some(other)) => self.base_override = Some(other.to_owned()),
            _ => {}
        }

        Ok(())
    }

    #[must_use]
    pub fn pro_enabled(&self) -> bool {
        !self.pro_services.is_empty()
    }
}

/// Artifact name for an image: the directory with `/` replaced by `-`,
/// followed by `_` and the sorted services joined with `_` when Pro services
/// are enabled
#[must_use]
pub fn artifact_name(directory: &str, pro_services: &BTreeSet<ProService>) -> String {
    let base = directory.replace('/', "-");
    if pro_services.is_empty() {
        return base;
    }
    format!("{base}_{}", join_services(pro_services, "_"))
}

/// Group images by `(directory, pro-services)` and check artifact names
///
/// # Errors
///
/// Returns an error if:
/// - Two declarations of one group set different `base-override` values
/// - Two different groups produce the same artifact name
pub fn group_images(config: &CiConfig) -> Result<Vec<ImageGroup>> {
    let mut groups: Vec<ImageGroup> = Vec::new();
    let mut index: HashMap<(&str, &BTreeSet<ProService>), usize> = HashMap::new();

    for image in &config.images {
        let key = (image.directory.as_str(), &image.pro_services);
        let position = *index.entry(key).or_insert_with(|| {
            groups.push(ImageGroup::new(image));
            groups.len() - 1
        });
        if let Some(group) = groups.get_mut(position) {
            group.merge(image)?;
        }
    }

    let mut artifacts: HashMap<&str, &ImageGroup> = HashMap::new();
    for group in &groups {
        if let Some(existing) = artifacts.insert(group.artifact_name.as_str(), group) {
            return Err(CiError::collision(format!(
                "Artifact name '{}' is shared by image '{}' (pro-services: [{}]) and image '{}' (pro-services: [{}])",
                group.artifact_name,
                existing.directory,
                join_services(&existing.pro_services, ", "),
                group.directory,
                join_services(&group.pro_services, ", "),
            ))
            .into());
        }
    }

    debug!(
        "Grouped {} image entries into {} builds",
        config.images.len(),
        groups.len()
    );
    Ok(groups)
}

/// Generate the build matrix: one row per `(directory, pro-services)` group
///
/// # Errors
///
/// Returns an error if grouping fails or an image's metadata cannot be read
pub fn build_matrix(config: &CiConfig, workspace: &Workspace<'_>) -> Result<Matrix<BuildRow>> {
    let mut matrix = Matrix::default();

    for group in group_images(config)? {
        let (name, tag) =
            image_name_and_tag(workspace, &group.directory, group.base_override.as_deref())?;
        let run_tests = workspace.has_test_spec(&group.directory);

        matrix.include.push(BuildRow {
            name,
            tag,
            pro_services: join_services(&group.pro_services, ","),
            run_tests,
            lfs: group.lfs,
            lfs_include: group.lfs_include.join(","),
            artifact_name: group.artifact_name,
            directory: group.directory,
        });
    }

    Ok(matrix)
}

/// Generate the upload matrix: one row per group and registry
///
/// Groups without registries are skipped. Registries are emitted in name order.
///
/// # Errors
///
/// Returns an error if grouping fails, an image's metadata cannot be read or
/// a registry is not declared
pub fn upload_matrix(config: &CiConfig, workspace: &Workspace<'_>) -> Result<Matrix<UploadRow>> {
    let mut matrix = Matrix::default();

    for group in group_images(config)? {
        if group.registries.is_empty() {
            continue;
        }

        let (name, tag) =
            image_name_and_tag(workspace, &group.directory, group.base_override.as_deref())?;

        for registry_name in &group.registries {
            let registry = config.registries.get(registry_name).ok_or_else(|| {
                CiError::reference(format!(
                    "Registry '{registry_name}' in image '{}' is not defined in registries.",
                    group.directory
                ))
            })?;

            matrix.include.push(UploadRow {
                name: name.clone(),
                tag: tag.clone(),
                artifact_name: group.artifact_name.clone(),
                pro_enabled: group.pro_enabled(),
                registry_uri: registry.uri.clone(),
                auth: registry.auth.output_fields(),
            });
        }
    }

    Ok(matrix)
}
