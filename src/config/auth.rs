//! Registry authentication methods
//!
//! An auth entry is resolved in two phases: the `method` tag selects a
//! variant, then the `config` payload is validated against that variant's
//! shape. Unknown tags and malformed payloads therefore produce distinct
//! errors.

use crate::error::CiError;
use anyhow::Result;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Prefix every credential reference must carry
pub const SECRET_PREFIX: &str = "secrets.";

/// Key prefix of the flattened auth fields in upload matrix rows
pub const AUTH_KEY_PREFIX: &str = "registry-auth-";

/// Authentication method tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMethod {
    Basic,
    Bearer,
    Ecr,
    EcrPublic,
}

impl AuthMethod {
    pub const ALL: [Self; 4] = [Self::Basic, Self::Bearer, Self::Ecr, Self::EcrPublic];

    #[must_use]
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Bearer => "bearer",
            Self::Ecr => "ecr",
            Self::EcrPublic => "ecr-public",
        }
    }
}

impl fmt::Display for AuthMethod {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = CiError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| {
                let supported: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
                CiError::schema(format!(
                    "Invalid auth method '{s}'. Supported methods are: {}.",
                    supported.join(", ")
                ))
            })
    }
}

/// Username/password credentials
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Token credentials
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BearerAuth {
    pub token: String,
}

/// AWS ECR credentials, shared by private and public ECR
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EcrAuth {
    pub region: String,
    pub username: String,
    pub password: String,
}

/// Validated authentication for one registry
///
/// Credential fields hold the secret name with the `secrets.` prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryAuth {
    Basic(BasicAuth),
    Bearer(BearerAuth),
    Ecr(EcrAuth),
    EcrPublic(EcrAuth),
}

impl RegistryAuth {
    /// Resolve an auth entry found at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `method` is not a supported method
    /// - `config` is missing or is not a mapping
    /// - `config` does not match the shape of the selected method
    /// - A credential field is not a `secrets.` reference
    pub fn resolve(path: &str, method: &str, config: Option<Value>) -> Result<Self> {
        let method: AuthMethod = method
            .parse()
            .map_err(|e: CiError| CiError::schema(format!("{path}.method: {}", e.message())))?;

        let config = match config {
            None | Some(Value::Null) => {
                return Err(
                    CiError::schema(format!("{path}.config: Auth config must be provided.")).into(),
                );
            }
            Some(value @ Value::Object(_)) => value,
            Some(_) => {
                return Err(
                    CiError::schema(format!("{path}.config: Auth config must be a mapping.")).into(),
                );
            }
        };

        let config_path = format!("{path}.config");
        let auth = match method {
            AuthMethod::Basic => {
                let raw: BasicAuth = payload(&config_path, config)?;
                Self::Basic(BasicAuth {
                    username: secret_reference(&config_path, "username", &raw.username)?,
                    password: secret_reference(&config_path, "password", &raw.password)?,
                })
            }
            AuthMethod::Bearer => {
                let raw: BearerAuth = payload(&config_path, config)?;
                Self::Bearer(BearerAuth {
                    token: secret_reference(&config_path, "token", &raw.token)?,
                })
            }
            AuthMethod::Ecr => Self::Ecr(ecr_payload(&config_path, config)?),
            AuthMethod::EcrPublic => Self::EcrPublic(ecr_payload(&config_path, config)?),
        };

        Ok(auth)
    }

    #[must_use]
    #[inline]
    pub const fn method(&self) -> AuthMethod {
        match *self {
            Self::Basic(_) => AuthMethod::Basic,
            Self::Bearer(_) => AuthMethod::Bearer,
            Self::Ecr(_) => AuthMethod::Ecr,
            Self::EcrPublic(_) => AuthMethod::EcrPublic,
        }
    }

    /// Flatten into `registry-auth-*` keys, including the method discriminator
    #[must_use]
    pub fn output_fields(&self) -> BTreeMap<String, String> {
        match self {
            Self::Basic(auth) => prefixed_fields(
                self.method(),
                &[
                    ("username", auth.username.as_str()),
                    ("password", auth.password.as_str()),
                ],
            ),
            Self::Bearer(auth) => prefixed_fields(self.method(), &[("token", auth.token.as_str())]),
            Self::Ecr(auth) | Self::EcrPublic(auth) => prefixed_fields(
                self.method(),
                &[
                    ("region", auth.region.as_str()),
                    ("username", auth.username.as_str()),
                    ("password", auth.password.as_str()),
                ],
            ),
        }
    }
}

fn prefixed_fields(method: AuthMethod, fields: &[(&str, &str)]) -> BTreeMap<String, String> {
    let mut result: BTreeMap<String, String> = fields
        .iter()
        .map(|(key, value)| (format!("{AUTH_KEY_PREFIX}{key}"), (*value).to_owned()))
        .collect();
    result.insert(
        format!("{AUTH_KEY_PREFIX}method"),
        method.as_str().to_owned(),
    );
    result
}

fn payload<T: DeserializeOwned>(path: &str, config: Value) -> Result<T> {
    serde_json::from_value(config).map_err(|e| CiError::schema(format!("{path}: {e}")).into())
}

fn ecr_payload(path: &str, config: Value) -> Result<EcrAuth> {
    let raw: EcrAuth = payload(path, config)?;
    Ok(EcrAuth {
        region: raw.region,
        username: secret_reference(path, "username", &raw.username)?,
        password: secret_reference(path, "password", &raw.password)?,
    })
}

/// Validate a credential reference and strip its `secrets.` prefix
///
/// # Errors
///
/// Returns an error if:
/// - The value is empty
/// - The value does not start with `secrets.`
pub fn secret_reference(path: &str, field: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(CiError::format(format!(
            "{path}.{field}: Credential name must be a non-empty string."
        ))
        .into());
    }

    value.strip_prefix(SECRET_PREFIX).map_or_else(
        || {
            Err(CiError::format(format!(
                "{path}.{field}: Credential name must start with '{SECRET_PREFIX}'"
            ))
            .into())
        },
        |name| Ok(name.to_owned()),
    )
}
