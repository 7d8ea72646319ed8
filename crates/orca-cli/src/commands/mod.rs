//! Subcommand implementations.

pub mod agents;
pub mod bootstrap;
pub mod check;
pub mod hook;
pub mod settings;

use orca_core::Config;
use std::path::{Path, PathBuf};

/// Session directory for a run: the given one, or a fresh ULID-named
/// directory under the configured sessions directory.
pub fn session_dir(project_dir: Option<&Path>, config: &Config) -> PathBuf {
    match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => config.sessions_dir().join(ulid::Ulid::new().to_string()),
    }
}
