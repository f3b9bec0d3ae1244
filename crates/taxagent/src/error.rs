use std::io;

use thiserror::Error;

use crate::settings::SettingsError;

/// Errors surfaced by the assistant.
#[derive(Debug, Error)]
pub enum Error {
    /// The settings are incomplete.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The OCI credentials could not be loaded.
    #[error(transparent)]
    Oci(#[from] taxagent_oci::ConfigError),

    /// The agent failed to set up or to run a turn.
    #[error(transparent)]
    Agent(#[from] taxagent_core::Error),

    /// The output could not be written.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}
