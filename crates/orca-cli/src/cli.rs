//! CLI argument and command definitions.

use clap::{Parser, Subcommand};
use orca_core::{Config, ConfigStore};
use orca_security::CommandAllowlist;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "orca",
    version,
    about = "Bootstrap sandboxed multi-agent orchestration sessions"
)]
pub struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of ~/.orca/config.json.
    #[arg(long, global = true, env = "ORCA_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the agent and orchestrator prompt files.
    #[arg(long, global = true, env = "ORCA_PROMPTS_DIR", value_name = "DIR")]
    pub prompts_dir: Option<PathBuf>,

    /// Program agents may run through the shell tool. Repeatable; added to
    /// the config file's `allowed_commands`.
    #[arg(long = "allow-command", global = true, value_name = "PROGRAM")]
    pub allow_commands: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare a session directory and print the orchestrator configuration.
    Bootstrap {
        /// Session directory. A fresh one is created under the sessions
        /// directory when omitted.
        #[arg(long, value_name = "DIR")]
        project_dir: Option<PathBuf>,

        /// Orchestrator tier (haiku, sonnet, opus). Defaults to
        /// ORCHESTRATOR_MODEL, then haiku.
        #[arg(long)]
        model: Option<String>,

        /// Print the launch payload as JSON instead of a summary.
        #[arg(long)]
        json: bool,

        /// Include gateway credentials in the JSON payload.
        #[arg(long, requires = "json")]
        show_secrets: bool,
    },

    /// Show the sub-agents a session would register.
    Agents {
        /// Session directory used for absolute prompt paths.
        #[arg(long, value_name = "DIR")]
        project_dir: Option<PathBuf>,

        /// Print the agent definitions as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Answer a PreToolUse hook call read from stdin.
    Hook,

    /// Check one shell command against the allowed commands.
    CheckCommand {
        /// The command line to check.
        command: String,
    },

    /// Print a session's security settings file.
    Settings {
        /// Session directory (defaults to the current directory).
        #[arg(long, value_name = "DIR")]
        project_dir: Option<PathBuf>,

        /// Print the settings file JSON Schema instead.
        #[arg(long)]
        schema: bool,
    },
}

impl Cli {
    pub fn config_store(&self) -> ConfigStore {
        match &self.config {
            Some(path) => ConfigStore::with_path(path),
            None => ConfigStore::new(),
        }
    }

    /// Load the config file and apply flag overrides.
    pub fn load_config(&self) -> Config {
        let mut config = self.config_store().load();
        if let Some(dir) = &self.prompts_dir {
            config.prompts_dir = Some(dir.clone());
        }
        config
            .allowed_commands
            .extend(self.allow_commands.iter().cloned());
        config
    }
}

/// Allow-list built from the merged configuration.
pub fn allowlist(config: &Config) -> CommandAllowlist {
    let allowlist = CommandAllowlist::new(&config.allowed_commands);
    if allowlist.is_empty() {
        tracing::warn!("No allowed commands configured; every shell command will be denied");
    }
    allowlist
}
