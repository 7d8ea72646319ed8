//! orca-core: Session bootstrap, agent catalog, model selection, and prompts.

pub mod catalog;
pub mod config;
mod error;
pub mod gateway;
pub mod mcp;
pub mod model;
pub mod prompts;
pub mod session;
pub mod tools;

pub use catalog::{AgentCatalog, AgentSpec, Specialization};
pub use config::{Config, ConfigStore};
pub use error::OrcaError;
pub use gateway::{GatewayConfig, GatewayError, GatewaySettings, GatewayTools};
pub use mcp::McpServer;
pub use model::{AgentModel, ModelDefaults, ModelResolver, ModelTier};
pub use prompts::PromptProvisioner;
pub use session::{BootstrapOptions, SessionBootstrapper, SessionConfig, MAX_TURNS};
pub use tools::ToolSurface;
