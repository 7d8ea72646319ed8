//! orca: sandboxed multi-agent session bootstrap
//!
//! Prepares a session directory, its security settings, and the agent
//! catalog, then hands the orchestrator configuration to the runtime.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use orca_security::CommandValidator;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output and hook decisions.
    let filter = if cli.verbose {
        EnvFilter::new("orca=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orca=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.load_config();

    match cli.command {
        Commands::Bootstrap {
            ref project_dir,
            ref model,
            json,
            show_secrets,
        } => {
            commands::bootstrap::run(
                &config,
                commands::bootstrap::BootstrapArgs {
                    project_dir: project_dir.as_deref(),
                    model: model.as_deref(),
                    json,
                    show_secrets,
                },
            )?;
        }
        Commands::Agents {
            ref project_dir,
            json,
        } => {
            commands::agents::run(&config, project_dir.as_deref(), json)?;
        }
        Commands::Hook => {
            let validator: Arc<dyn CommandValidator> = Arc::new(cli::allowlist(&config));
            commands::hook::run(validator)?;
        }
        Commands::CheckCommand { ref command } => {
            if !commands::check::run(&cli::allowlist(&config), command) {
                std::process::exit(1);
            }
        }
        Commands::Settings {
            ref project_dir,
            schema,
        } => {
            commands::settings::run(project_dir.as_deref(), schema)?;
        }
    }

    Ok(())
}
