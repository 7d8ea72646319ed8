use orca_core::{
    AgentCatalog, Config, GatewayConfig, ModelDefaults, ModelResolver, ToolSurface,
};
use std::path::Path;

/// Print the catalog a session would register. Gateway credentials are not
/// required; only the declared tool names are used.
pub fn run(config: &Config, project_dir: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let resolver = ModelResolver::new(ModelDefaults::standard());
    let surface = ToolSurface::new(&GatewayConfig::from_env(&config.gateway));
    let catalog = AgentCatalog::build(&resolver, &surface, project_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog.payload()?)?);
        return Ok(());
    }

    for agent in catalog.iter() {
        println!("{} [{}] - {}", agent.name(), agent.model(), agent.description());
        println!("  tools: {}", agent.tools().join(", "));
    }
    Ok(())
}
