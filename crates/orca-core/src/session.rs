//! Session bootstrap.
//!
//! Bootstrap runs once per session directory, synchronously. Every step is a
//! precondition for the next; the first failure aborts and no session
//! configuration is produced.

use crate::catalog::AgentCatalog;
use crate::config::Config;
use crate::error::OrcaError;
use crate::gateway::GatewayConfig;
use crate::mcp::McpServer;
use crate::model::{ModelDefaults, ModelResolver, ModelTier};
use crate::prompts::PromptProvisioner;
use crate::tools::{default_browser_server, ToolSurface, BROWSER_SERVER};
use orca_security::{persist, CommandValidator, HookMatcher, SecurityPolicy, PRE_TOOL_USE};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Ceiling on agent turns for one session.
pub const MAX_TURNS: u32 = 1000;

/// Default ceiling, in characters, on the serialized agent definitions.
pub const DEFAULT_TRANSPORT_LIMIT: usize = 100_000;

/// Inputs to [`SessionBootstrapper`].
#[derive(Clone)]
pub struct BootstrapOptions {
    /// Where the prompt files are copied from.
    pub prompts_dir: PathBuf,
    pub gateway: GatewayConfig,
    pub browser_server: McpServer,
    /// Validator registered on the shell tool's pre-execution path.
    pub validator: Arc<dyn CommandValidator>,
    pub resolver: ModelResolver,
    /// Upper bound the runtime transport accepts for the agent definitions.
    pub transport_limit: usize,
}

impl BootstrapOptions {
    /// Options with the standard browser server, model defaults read from
    /// the environment, and the default transport limit.
    pub fn new(
        prompts_dir: impl Into<PathBuf>,
        gateway: GatewayConfig,
        validator: Arc<dyn CommandValidator>,
    ) -> Self {
        Self {
            prompts_dir: prompts_dir.into(),
            gateway,
            browser_server: default_browser_server(),
            validator,
            resolver: ModelResolver::new(ModelDefaults::standard()),
            transport_limit: DEFAULT_TRANSPORT_LIMIT,
        }
    }

    /// Options taking prompt location, browser server, and transport limit
    /// from the config file.
    pub fn from_config(
        config: &Config,
        gateway: GatewayConfig,
        validator: Arc<dyn CommandValidator>,
    ) -> Self {
        Self {
            browser_server: config.browser_server.clone(),
            transport_limit: config.transport_limit,
            ..Self::new(config.prompts_dir(), gateway, validator)
        }
    }

    pub fn with_resolver(mut self, resolver: ModelResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_transport_limit(mut self, limit: usize) -> Self {
        self.transport_limit = limit;
        self
    }
}

impl fmt::Debug for BootstrapOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapOptions")
            .field("prompts_dir", &self.prompts_dir)
            .field("gateway", &self.gateway)
            .field("browser_server", &self.browser_server.endpoint())
            .field("validator", &self.validator.name())
            .field("resolver", &self.resolver)
            .field("transport_limit", &self.transport_limit)
            .finish()
    }
}

/// Everything the runtime needs to start the orchestrator.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub model: ModelTier,
    pub system_prompt: String,
    pub allowed_tools: Vec<String>,
    /// MCP servers keyed by provider name.
    pub mcp_servers: BTreeMap<String, McpServer>,
    /// Hook matchers keyed by hook event.
    pub hooks: BTreeMap<String, Vec<HookMatcher>>,
    pub agents: AgentCatalog,
    pub max_turns: u32,
    /// Absolute session directory, the runtime's working root.
    pub cwd: PathBuf,
    pub settings_path: PathBuf,
    pub transport_limit: usize,
}

impl SessionConfig {
    /// JSON rendering of the configuration for the runtime launcher.
    ///
    /// Hooks are rendered as their validator names. With `redact`, MCP
    /// credentials are masked.
    pub fn launch_payload(&self, redact: bool) -> Result<Value, OrcaError> {
        let mcp_servers: BTreeMap<&str, McpServer> = self
            .mcp_servers
            .iter()
            .map(|(name, server)| {
                let server = if redact { server.redacted() } else { server.clone() };
                (name.as_str(), server)
            })
            .collect();
        let hooks: BTreeMap<&str, Vec<Value>> = self
            .hooks
            .iter()
            .map(|(event, matchers)| {
                let matchers = matchers
                    .iter()
                    .map(|m| json!({"matcher": m.matcher(), "hooks": [m.validator().name()]}))
                    .collect();
                (event.as_str(), matchers)
            })
            .collect();

        Ok(json!({
            "model": self.model,
            "system_prompt": self.system_prompt,
            "allowed_tools": self.allowed_tools,
            "mcp_servers": mcp_servers,
            "hooks": hooks,
            "agents": self.agents.payload()?,
            "max_turns": self.max_turns,
            "cwd": self.cwd,
            "settings": self.settings_path,
            "transport_limit": self.transport_limit,
        }))
    }
}

/// Assembles a [`SessionConfig`] for a session directory.
#[derive(Debug, Clone)]
pub struct SessionBootstrapper {
    options: BootstrapOptions,
    provisioner: PromptProvisioner,
}

impl SessionBootstrapper {
    pub fn new(options: BootstrapOptions) -> Self {
        let provisioner = PromptProvisioner::new(options.prompts_dir.clone());
        Self {
            options,
            provisioner,
        }
    }

    pub fn options(&self) -> &BootstrapOptions {
        &self.options
    }

    /// Prepare `session_dir` and build the session configuration.
    ///
    /// Order: gateway validation, prompt provisioning, security settings,
    /// agent catalog, orchestrator prompt. The gateway is checked before
    /// anything is written. Without an explicit `model` the orchestrator tier
    /// comes from the resolver.
    pub fn bootstrap(
        &self,
        session_dir: &Path,
        model: Option<ModelTier>,
    ) -> Result<SessionConfig, OrcaError> {
        let options = &self.options;
        options.gateway.validate()?;
        let model = model.unwrap_or_else(|| options.resolver.orchestrator());

        let prompts_dest = self.provisioner.provision(session_dir)?;

        let surface = ToolSurface::new(&options.gateway);
        let policy = SecurityPolicy::build(
            Arc::clone(&options.validator),
            surface.browser_tools().iter().cloned(),
            options.gateway.permission_pattern(),
        );
        policy.validate()?;
        let settings_path = persist(session_dir, &policy)?;

        let cwd = session_dir
            .canonicalize()
            .map_err(|source| OrcaError::SessionDir {
                path: session_dir.to_path_buf(),
                source,
            })?;

        info!(settings = %settings_path.display(), "Created security settings");
        info!(prompts = %prompts_dest.display(), "Agent prompts copied");
        info!("Sandbox enabled (OS-level bash isolation)");
        info!(root = %cwd.display(), "Filesystem restricted to session directory");
        info!(validator = options.validator.name(), "Bash commands restricted by pre-execution hook");
        info!(
            browser = %options.browser_server.endpoint(),
            gateway = %options.gateway.url,
            "MCP servers configured"
        );

        let agents = AgentCatalog::build(&options.resolver, &surface, Some(&cwd))?;
        let payload_len = agents.payload_len()?;
        if payload_len > options.transport_limit {
            return Err(OrcaError::PayloadTooLarge {
                actual: payload_len,
                limit: options.transport_limit,
            });
        }
        info!(
            agents = ?agents.names(),
            chars = payload_len,
            limit = options.transport_limit,
            "Agent definitions ready"
        );

        let system_prompt = self.provisioner.load_orchestrator_prompt()?;

        let mut mcp_servers = BTreeMap::new();
        mcp_servers.insert(BROWSER_SERVER.to_string(), options.browser_server.clone());
        mcp_servers.insert(options.gateway.name.clone(), options.gateway.server());

        let mut hooks = BTreeMap::new();
        hooks.insert(PRE_TOOL_USE.to_string(), policy.hook_matchers());

        Ok(SessionConfig {
            model,
            system_prompt,
            allowed_tools: surface.allowed_tools(),
            mcp_servers,
            hooks,
            agents,
            max_turns: MAX_TURNS,
            cwd,
            settings_path,
            transport_limit: options.transport_limit,
        })
    }
}
