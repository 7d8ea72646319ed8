use crate::gateway::GatewaySettings;
use crate::mcp::McpServer;
use crate::session::DEFAULT_TRANSPORT_LIMIT;
use crate::tools::default_browser_server;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Serialized settings from ~/.orca/config.json
///
/// Only deployment details live here. The security posture is fixed in code
/// and cannot be loosened through this file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source directory of the prompt files.
    pub prompts_dir: Option<PathBuf>,
    /// Parent directory for generated session directories.
    pub sessions_dir: Option<PathBuf>,
    pub gateway: GatewaySettings,
    pub browser_server: McpServer,
    /// Programs the command hook lets agents run.
    pub allowed_commands: Vec<String>,
    /// Upper bound, in characters, on the agent definitions payload.
    pub transport_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompts_dir: None,
            sessions_dir: None,
            gateway: GatewaySettings::default(),
            browser_server: default_browser_server(),
            allowed_commands: Vec::new(),
            transport_limit: DEFAULT_TRANSPORT_LIMIT,
        }
    }
}

impl Config {
    /// Prompt source directory, defaulting to `./prompts`.
    pub fn prompts_dir(&self) -> PathBuf {
        self.prompts_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("prompts"))
    }

    /// Parent of generated session directories, defaulting to the user data dir.
    pub fn sessions_dir(&self) -> PathBuf {
        self.sessions_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("orca")
                .join("sessions")
        })
    }
}

/// Location of the user-level config file.
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".orca");
        path.push("config.json");
        Self { path }
    }

    /// Store at an explicit location (for `--config` and tests).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the saved config. A missing or unreadable file yields the defaults.
    pub fn load(&self) -> Config {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Config::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable config file");
                Config::default()
            }
        }
    }

    /// Write the config, creating the parent directory if needed.
    pub fn save(&self, config: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)
    }
}
