//! Ubuntu Pro service names accepted in `pro-services`

use crate::error::CiError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A subscription-gated Ubuntu Pro channel that can be enabled for a build
///
/// Variants are declared in lexicographic order of their names so that the
/// derived `Ord` sorts the same way the names do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProService {
    EsmApps,
    EsmInfra,
    Fips,
    FipsPreview,
    FipsUpdates,
    Ros,
    RosUpdates,
}

impl ProService {
    /// All known services, sorted by name
    pub const ALL: [Self; 7] = [
        Self::EsmApps,
        Self::EsmInfra,
        Self::Fips,
        Self::FipsPreview,
        Self::FipsUpdates,
        Self::Ros,
        Self::RosUpdates,
    ];

    #[must_use]
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EsmApps => "esm-apps",
            Self::EsmInfra => "esm-infra",
            Self::Fips => "fips",
            Self::FipsPreview => "fips-preview",
            Self::FipsUpdates => "fips-updates",
            Self::Ros => "ros",
            Self::RosUpdates => "ros-updates",
        }
    }
}

impl fmt::Display for ProService {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProService {
    type Err = CiError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| CiError::reference(format!("Invalid Ubuntu Pro service '{s}'")))
    }
}

/// Join service names with `separator`, keeping iteration order
pub fn join_services<'a, I>(services: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'a ProService>,
{
    services
        .into_iter()
        .map(|service| service.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}
