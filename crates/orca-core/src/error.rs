//! Error types for the orca-core crate.

use crate::gateway::GatewayError;
use orca_security::{PolicyViolation, SettingsError};
use std::path::PathBuf;

/// Errors that abort session bootstrap.
///
/// Every variant is fatal: a session never starts with a partially
/// configured security policy.
#[derive(Debug, thiserror::Error)]
pub enum OrcaError {
    /// Missing or invalid gateway configuration.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Prompt file could not be read, copied, or its destination created.
    #[error(
        "Failed to provision prompt file {}: {source}\nCheck file permissions and disk space.",
        path.display()
    )]
    Prompt {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Session directory could not be resolved.
    #[error("Cannot resolve session directory {}: {source}", path.display())]
    SessionDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Settings file could not be written.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The assembled policy broke one of its invariants.
    #[error("Security policy is misconfigured: {0}")]
    Policy(#[from] PolicyViolation),

    /// Agent definitions would not fit through the runtime transport.
    #[error(
        "Agent definitions are {actual} characters, above the transport limit of {limit}"
    )]
    PayloadTooLarge { actual: usize, limit: usize },

    /// Agent name with no registered prompt file.
    #[error("Unknown agent '{0}'")]
    UnknownAgent(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
