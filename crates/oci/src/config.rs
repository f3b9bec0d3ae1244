use std::fmt::{self, Debug};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::Url;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey as _;
use rsa::pkcs8::DecodePrivateKey as _;
use thiserror::Error;

use crate::profile::{DEFAULT_PROFILE, Profile, parse_profile};
use crate::signer::SECURITY_TOKEN_PREFIX;

/// Errors that can occur while reading the OCI configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file could not be read.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The requested profile is not declared in the config file.
    #[error("profile '{profile}' not found in {path:?}")]
    ProfileNotFound {
        /// Name of the profile.
        profile: String,
        /// Path of the config file.
        path: PathBuf,
    },

    /// The profile lacks an entry the chosen authentication needs.
    #[error("profile '{profile}' is missing required key '{key}'")]
    MissingKey {
        /// Name of the profile.
        profile: String,
        /// Name of the missing entry.
        key: &'static str,
    },

    /// The private key could not be decoded.
    #[error("invalid private key in {path:?}: {reason}")]
    InvalidKey {
        /// Path of the key file.
        path: PathBuf,
        /// Why decoding failed.
        reason: String,
    },

    /// A service endpoint is not a valid URL.
    #[error("invalid service endpoint '{endpoint}'")]
    InvalidEndpoint {
        /// The rejected endpoint.
        endpoint: String,
    },
}

/// How requests are authenticated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AuthType {
    /// A user API signing key (`user`, `fingerprint`, `key_file`).
    #[default]
    ApiKey,
    /// A session token obtained through browser login
    /// (`security_token_file`, `key_file`).
    SecurityToken,
}

/// Builder for [`OciConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OciConfigBuilder {
    config_file: PathBuf,
    auth_type: AuthType,
    profile: Option<String>,
    region: Option<String>,
    service_endpoint: Option<String>,
}

impl OciConfigBuilder {
    /// Creates a builder reading the given OCI config file.
    #[inline]
    pub fn with_config_file<P: Into<PathBuf>>(config_file: P) -> Self {
        Self {
            config_file: config_file.into(),
            auth_type: AuthType::default(),
            profile: None,
            region: None,
            service_endpoint: None,
        }
    }

    /// Sets the authentication type.
    #[inline]
    pub fn with_auth_type(mut self, auth_type: AuthType) -> Self {
        self.auth_type = auth_type;
        self
    }

    /// Sets the profile to read, `DEFAULT` if unset.
    #[inline]
    pub fn with_profile<S: Into<String>>(mut self, profile: S) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Sets the region, overriding the one in the profile.
    #[inline]
    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets a custom base URL for the conversation runtime.
    #[inline]
    pub fn with_service_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.service_endpoint = Some(endpoint.into());
        self
    }

    /// Reads the config file and the private key it references.
    ///
    /// Only local files are touched; credentials are not checked against
    /// the service until the first request.
    pub fn build(self) -> Result<OciConfig, ConfigError> {
        let config_file = expand_path(&self.config_file);
        let content = read_file(&config_file)?;
        let profile_name =
            self.profile.unwrap_or_else(|| DEFAULT_PROFILE.to_owned());
        let profile = parse_profile(&content, &profile_name).ok_or_else(|| {
            ConfigError::ProfileNotFound {
                profile: profile_name.clone(),
                path: config_file.clone(),
            }
        })?;
        let lookup = |key: &'static str| {
            profile
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| ConfigError::MissingKey {
                    profile: profile_name.clone(),
                    key,
                })
        };

        let tenancy = lookup("tenancy")?;
        let region = match self.region.filter(|r| !r.is_empty()) {
            Some(region) => region,
            None => lookup("region")?,
        };
        let key_id = match self.auth_type {
            AuthType::ApiKey => {
                format!("{tenancy}/{}/{}", lookup("user")?, lookup("fingerprint")?)
            }
            AuthType::SecurityToken => {
                let token_file = expand_path(Path::new(
                    &lookup("security_token_file")?,
                ));
                format!(
                    "{SECURITY_TOKEN_PREFIX}{}",
                    read_file(&token_file)?.trim()
                )
            }
        };
        let private_key = load_private_key(&profile, &profile_name)?;

        let management_endpoint = parse_endpoint(&format!(
            "https://agent.generativeai.{region}.oci.oraclecloud.com"
        ))?;
        let runtime_endpoint = match self.service_endpoint {
            Some(endpoint) if !endpoint.is_empty() => parse_endpoint(&endpoint)?,
            _ => parse_endpoint(&format!(
                "https://agent-runtime.generativeai.{region}.oci.oraclecloud.com"
            ))?,
        };

        debug!(
            profile = %profile_name,
            %region,
            auth_type = ?self.auth_type,
            "loaded OCI configuration"
        );

        Ok(OciConfig {
            key_id,
            private_key,
            region,
            management_endpoint,
            runtime_endpoint,
        })
    }
}

impl Debug for OciConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OciConfigBuilder")
            .field("config_file", &self.config_file)
            .field("auth_type", &self.auth_type)
            .field("profile", &self.profile)
            .field("region", &self.region)
            .field("service_endpoint", &self.service_endpoint)
            .finish()
    }
}

/// Configuration for [`OciAgentService`](crate::OciAgentService).
#[derive(Clone)]
pub struct OciConfig {
    pub(crate) key_id: String,
    pub(crate) private_key: RsaPrivateKey,
    pub(crate) region: String,
    pub(crate) management_endpoint: Url,
    pub(crate) runtime_endpoint: Url,
}

impl OciConfig {
    /// Returns the region requests are sent to.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Returns the base URL of agent and tool management.
    #[inline]
    pub fn management_endpoint(&self) -> &Url {
        &self.management_endpoint
    }

    /// Returns the base URL of sessions and chat.
    #[inline]
    pub fn runtime_endpoint(&self) -> &Url {
        &self.runtime_endpoint
    }
}

impl Debug for OciConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OciConfig")
            .field("key_id", &"<deducted>")
            .field("private_key", &"<deducted>")
            .field("region", &self.region)
            .field("management_endpoint", &self.management_endpoint.as_str())
            .field("runtime_endpoint", &self.runtime_endpoint.as_str())
            .finish()
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_private_key(
    profile: &Profile,
    profile_name: &str,
) -> Result<RsaPrivateKey, ConfigError> {
    let key_file = profile
        .get("key_file")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingKey {
            profile: profile_name.to_owned(),
            key: "key_file",
        })?;
    let path = expand_path(Path::new(key_file));
    let pem = read_file(&path)?;

    if pem.contains("ENCRYPTED") {
        return Err(ConfigError::InvalidKey {
            path,
            reason: "encrypted keys are not supported".to_owned(),
        });
    }
    RsaPrivateKey::from_pkcs8_pem(&pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&pem))
        .map_err(|err| ConfigError::InvalidKey {
            path,
            reason: err.to_string(),
        })
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    Url::parse(endpoint)
        .ok()
        .filter(|url| !url.cannot_be_a_base())
        .ok_or_else(|| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
        })
}
