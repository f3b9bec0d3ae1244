//! Settings read from the environment and an optional dotenv file.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Where [`Settings::load`] looks for the dotenv file by default.
pub const DEFAULT_ENV_FILE: &str = "config/.env";

/// Errors raised while loading [`Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A required key is unset or blank.
    #[error("required setting `{key}` is not set")]
    Missing {
        /// Name of the key.
        key: &'static str,
    },

    /// The dotenv file exists but could not be parsed.
    #[error("failed to load `{}`: {source}", path.display())]
    EnvFile {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: dotenvy::Error,
    },
}

/// Everything needed to reach the agent and its knowledge bases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Path of the OCI config file (`OCI_CONFIG_FILE`).
    pub oci_config_file: String,
    /// Profile in the OCI config file (`OCI_PROFILE`).
    pub oci_profile: String,
    /// Region hosting the agent (`AGENT_REGION`).
    pub agent_region: String,
    /// Agent endpoint id (`AGENT_EP_ID`).
    pub agent_endpoint_id: String,
    /// Meals and entertainment knowledge base id (`TAX_AGENT_KB_ME_ID`).
    pub kb_meals_id: String,
    /// Runtime endpoint override (`AGENT_SERVICE_EP`).
    pub service_endpoint: Option<String>,
    /// Business knowledge base id (`TAX_AGENT_KB_BUS_ID`).
    pub kb_business_id: Option<String>,
    /// Database tools connection id (`SQL_DB_TOOL_CONNECTION_ID`).
    pub sql_connection_id: Option<String>,
}

impl Settings {
    /// Loads `env_file` into the process environment, then reads the
    /// settings from it.
    ///
    /// Variables already set in the environment win over the file. A
    /// missing file is not an error.
    pub fn load<P: AsRef<Path>>(env_file: P) -> Result<Self, SettingsError> {
        let path = env_file.as_ref();
        match dotenvy::from_path(path) {
            Ok(()) => debug!("loaded {}", path.display()),
            Err(err) if err.not_found() => {
                debug!("{} not found, using the environment", path.display());
            }
            Err(source) => {
                return Err(SettingsError::EnvFile {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the settings through `lookup`.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &'static str| {
            optional(key).ok_or(SettingsError::Missing { key })
        };

        Ok(Self {
            oci_config_file: required("OCI_CONFIG_FILE")?,
            oci_profile: required("OCI_PROFILE")?,
            agent_region: required("AGENT_REGION")?,
            agent_endpoint_id: required("AGENT_EP_ID")?,
            kb_meals_id: required("TAX_AGENT_KB_ME_ID")?,
            service_endpoint: optional("AGENT_SERVICE_EP"),
            kb_business_id: optional("TAX_AGENT_KB_BUS_ID"),
            sql_connection_id: optional("SQL_DB_TOOL_CONNECTION_ID"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use super::*;

    fn lookup(
        pairs: &[(&str, &str)],
    ) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const COMPLETE: &[(&str, &str)] = &[
        ("OCI_CONFIG_FILE", "~/.oci/config"),
        ("OCI_PROFILE", "DEFAULT"),
        ("AGENT_REGION", "us-chicago-1"),
        ("AGENT_EP_ID", "ocid1.genaiagentendpoint.oc1..ep"),
        ("TAX_AGENT_KB_ME_ID", "ocid1.genaiagentknowledgebase.oc1..me"),
        ("TAX_AGENT_KB_BUS_ID", "  "),
    ];

    #[test]
    fn test_from_lookup() {
        let settings = Settings::from_lookup(lookup(COMPLETE)).unwrap();
        assert_eq!(settings.agent_region, "us-chicago-1");
        assert_eq!(
            settings.kb_meals_id,
            "ocid1.genaiagentknowledgebase.oc1..me"
        );
        assert_eq!(settings.service_endpoint, None);
        assert_eq!(settings.kb_business_id, None);
    }

    #[test]
    fn test_missing_keys_are_named() {
        for key in [
            "OCI_CONFIG_FILE",
            "OCI_PROFILE",
            "AGENT_REGION",
            "AGENT_EP_ID",
            "TAX_AGENT_KB_ME_ID",
        ] {
            let pairs: Vec<_> = COMPLETE
                .iter()
                .copied()
                .filter(|(k, _)| *k != key)
                .collect();
            let err = Settings::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(
                matches!(err, SettingsError::Missing { key: k } if k == key)
            );
            assert!(format!("{err}").contains(key));
        }

        let pairs: Vec<_> = COMPLETE
            .iter()
            .map(|&(k, v)| (k, if k == "AGENT_EP_ID" { " " } else { v }))
            .collect();
        let err = Settings::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, SettingsError::Missing { key: "AGENT_EP_ID" }));
    }

    #[test]
    fn test_load_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "TAXAGENT_TEST_SETTING=from-file\nTAXAGENT_TEST_KEEP=from-file\n",
        )
        .unwrap();
        // SAFETY: no other test reads or writes these variables.
        unsafe { env::set_var("TAXAGENT_TEST_KEEP", "from-env") };

        // The file is loaded even though required keys are missing.
        let _ = Settings::load(&path);
        assert_eq!(env::var("TAXAGENT_TEST_SETTING").unwrap(), "from-file");
        assert_eq!(env::var("TAXAGENT_TEST_KEEP").unwrap(), "from-env");

        let err = Settings::load(dir.path().join("missing.env"));
        assert!(!matches!(err, Err(SettingsError::EnvFile { .. })));
    }
}
