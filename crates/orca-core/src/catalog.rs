//! Sub-agent definitions invocable by the orchestrator.

use crate::error::OrcaError;
use crate::model::{AgentModel, ModelResolver};
use crate::prompts::stub_prompt;
use crate::tools::{ToolList, ToolSurface, FILE_TOOLS};
use serde::Serialize;
use std::path::Path;

/// The four sub-agent specializations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specialization {
    /// Issue tracking.
    Linear,
    /// Version control.
    Github,
    /// Messaging.
    Slack,
    /// Implementation and testing.
    Coding,
}

impl Specialization {
    pub const ALL: [Specialization; 4] = [
        Specialization::Linear,
        Specialization::Github,
        Specialization::Slack,
        Specialization::Coding,
    ];

    /// Stable machine-readable name, also the key in the agent catalog.
    pub fn name(self) -> &'static str {
        match self {
            Specialization::Linear => "linear",
            Specialization::Github => "github",
            Specialization::Slack => "slack",
            Specialization::Coding => "coding",
        }
    }

    /// Description the orchestrator uses to pick an agent.
    pub fn description(self) -> &'static str {
        match self {
            Specialization::Linear => {
                "Manages Linear issues, project status, and session handoff. Use for any Linear operations."
            }
            Specialization::Github => {
                "Handles Git commits, branches, and GitHub PRs. Use for version control operations."
            }
            Specialization::Slack => {
                "Sends Slack notifications to keep users informed. Use for progress updates."
            }
            Specialization::Coding => {
                "Writes and tests code. Use when implementing features or fixing bugs."
            }
        }
    }

    /// Provider tools plus the shared file baseline. Only the version-control
    /// agent gets raw shell access on top of it.
    pub fn tools(self, surface: &ToolSurface) -> Vec<String> {
        match self {
            Specialization::Linear => ToolList::new()
                .with(surface.issue_tracking_tools())
                .with(FILE_TOOLS)
                .into_vec(),
            Specialization::Github => ToolList::new()
                .with(surface.version_control_tools())
                .with(FILE_TOOLS)
                .with(["Bash"])
                .into_vec(),
            Specialization::Slack => ToolList::new()
                .with(surface.messaging_tools())
                .with(FILE_TOOLS)
                .into_vec(),
            Specialization::Coding => surface.coding_tools(),
        }
    }
}

/// Definition of one sub-agent as the runtime receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSpec {
    #[serde(skip)]
    name: String,
    description: String,
    prompt: String,
    tools: Vec<String>,
    model: AgentModel,
}

impl AgentSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Stub prompt pointing at the agent's full instructions.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn model(&self) -> AgentModel {
        self.model
    }
}

/// The set of sub-agents registered for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentCatalog {
    agents: Vec<AgentSpec>,
}

impl AgentCatalog {
    /// Build one definition per specialization.
    ///
    /// Pass the session directory to give stub prompts absolute paths.
    pub fn build(
        resolver: &ModelResolver,
        surface: &ToolSurface,
        session_dir: Option<&Path>,
    ) -> Result<Self, OrcaError> {
        let agents = Specialization::ALL
            .into_iter()
            .map(|kind| {
                Ok(AgentSpec {
                    name: kind.name().to_string(),
                    description: kind.description().to_string(),
                    prompt: stub_prompt(kind.name(), session_dir)?,
                    tools: kind.tools(surface),
                    model: resolver.resolve(kind.name()),
                })
            })
            .collect::<Result<Vec<_>, OrcaError>>()?;
        Ok(Self { agents })
    }

    pub fn get(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|agent| agent.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentSpec> {
        self.agents.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(AgentSpec::name).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agent definitions keyed by name, as passed on the runtime command line.
    pub fn payload(&self) -> Result<serde_json::Value, OrcaError> {
        let mut map = serde_json::Map::new();
        for agent in &self.agents {
            map.insert(agent.name.clone(), serde_json::to_value(agent)?);
        }
        Ok(serde_json::Value::Object(map))
    }

    /// Length in characters of the serialized agent definitions.
    pub fn payload_len(&self) -> Result<usize, OrcaError> {
        Ok(serde_json::to_string(&self.payload()?)?.chars().count())
    }
}
