//! Image name and tag derivation from `rockcraft.yaml`

use crate::error::CiError;
use crate::metadata::Workspace;
use anyhow::Result;
use regex::Regex;
use tracing::{debug, warn};

/// Channel every tag is published to
pub const CHANNEL: &str = "edge";

/// Base value meaning the real base is given by `build-base`
pub const BARE_BASE: &str = "bare";

/// Version that is accepted but reported
pub const LATEST_VERSION: &str = "latest";

// Matches base version ids like '22.04', '24@04' or 'devel' at the end of a base
const BASE_VERSION_PATTERN: &str = r"(\d{2}[.@]\d{2}|devel)$";

/// Extract the short base version from a base string
///
/// `ubuntu:24.04` and `ubuntu@24.04` give `24.04`, `devel` gives `devel`.
///
/// # Errors
///
/// Returns a format error naming the base when it carries no version
pub fn base_version(base: &str) -> Result<String> {
    let regex = Regex::new(BASE_VERSION_PATTERN)?;
    regex
        .captures(base)
        .and_then(|captures| captures.get(1))
        .map(|version| version.as_str().to_owned())
        .ok_or_else(|| {
            CiError::format(format!("Base '{base}' does not match the expected pattern.")).into()
        })
}

/// Read the image name and compute its tag
///
/// The tag is `{version}-{base version}_edge`. When the declared base is
/// `bare`, the base version comes from `base_override` if given, otherwise
/// from `build-base`. An override on an image with a non-bare base is ignored.
///
/// # Errors
///
/// Returns an error if:
/// - The metadata file is missing or malformed
/// - A bare base has neither an override nor a `build-base`
/// - The selected base carries no recognizable version
pub fn image_name_and_tag(
    workspace: &Workspace<'_>,
    directory: &str,
    base_override: Option<&str>,
) -> Result<(String, String)> {
    let metadata = workspace.image_metadata(directory)?;
    let source = format!("{directory}/rockcraft.yaml");

    let base = if metadata.base == BARE_BASE {
        match base_override {
            Some(base_override) => base_override,
            None => metadata.build_base.as_deref().ok_or_else(|| {
                CiError::metadata(format!(
                    "Base '{BARE_BASE}' in '{source}' requires a build-base"
                ))
            })?,
        }
    } else {
        if let Some(base_override) = base_override {
            debug!(
                "Ignoring base-override '{base_override}' for '{directory}': base is '{}'",
                metadata.base
            );
        }
        metadata.base.as_str()
    };

    let base = base_version(base).map_err(|_| {
        CiError::format(format!(
            "Base '{base}' in '{source}' does not match the expected pattern.\n\
            See https://documentation.ubuntu.com/rockcraft/stable/reference/rockcraft.yaml/#base for supported base values."
        ))
    })?;

    if metadata.version == LATEST_VERSION {
        warn!("Using '{LATEST_VERSION}' as version for '{directory}', tag set to '{LATEST_VERSION}'");
    }

    let tag = format!("{}-{base}_{CHANNEL}", metadata.version);
    Ok((metadata.name, tag))
}
