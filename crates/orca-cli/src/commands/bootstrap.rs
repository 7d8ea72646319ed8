use crate::cli::allowlist;
use orca_core::{
    BootstrapOptions, Config, GatewayConfig, ModelDefaults, ModelResolver, ModelTier,
    SessionBootstrapper, SessionConfig,
};
use orca_security::CommandValidator;
use std::path::Path;
use std::sync::Arc;

pub struct BootstrapArgs<'a> {
    pub project_dir: Option<&'a Path>,
    pub model: Option<&'a str>,
    pub json: bool,
    pub show_secrets: bool,
}

pub fn run(config: &Config, args: BootstrapArgs<'_>) -> anyhow::Result<()> {
    let tier = parse_tier(args.model)?;
    let session_dir = super::session_dir(args.project_dir, config);

    let validator: Arc<dyn CommandValidator> = Arc::new(allowlist(config));
    let gateway = GatewayConfig::from_env(&config.gateway);
    let options = BootstrapOptions::from_config(config, gateway, validator)
        .with_resolver(ModelResolver::new(ModelDefaults::standard()));
    let session = SessionBootstrapper::new(options).bootstrap(&session_dir, tier)?;

    if args.json {
        let payload = session.launch_payload(!args.show_secrets)?;
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_summary(&session)?;
    }
    Ok(())
}

/// An explicit `--model` must name a tier. Without one the bootstrapper
/// falls back to `ORCHESTRATOR_MODEL`, quietly ignoring bad values.
fn parse_tier(flag: Option<&str>) -> anyhow::Result<Option<ModelTier>> {
    flag.map(|value| {
        ModelTier::parse(value).ok_or_else(|| {
            anyhow::anyhow!("Unknown model tier '{value}': expected haiku, sonnet, or opus")
        })
    })
    .transpose()
}

fn print_summary(session: &SessionConfig) -> anyhow::Result<()> {
    println!("Session directory: {}", session.cwd.display());
    println!("Security settings: {}", session.settings_path.display());
    println!("Orchestrator model: {}", session.model);
    println!("Max turns: {}", session.max_turns);
    println!(
        "MCP servers: {}",
        session
            .mcp_servers
            .iter()
            .map(|(name, server)| format!("{name} ({})", server.endpoint()))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Agents:");
    for agent in session.agents.iter() {
        println!(
            "  {:<8} {:<8} {} tools",
            agent.name(),
            agent.model(),
            agent.tools().len()
        );
    }
    println!(
        "Agent definitions: {} / {} characters",
        session.agents.payload_len()?,
        session.transport_limit
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_tier;
    use orca_core::ModelTier;

    #[test]
    fn test_flag_is_normalized() {
        assert_eq!(parse_tier(Some(" Sonnet ")).unwrap(), Some(ModelTier::Sonnet));
        assert_eq!(parse_tier(None).unwrap(), None);
    }

    #[test]
    fn test_unknown_flag_value_is_an_error() {
        let err = parse_tier(Some("inherit")).unwrap_err();
        assert!(err.to_string().contains("inherit"));
    }
}
