//! Model tier selection for the orchestrator and its sub-agents.
//!
//! Resolution never fails: an unrecognized override is ignored and the
//! registered default is used instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Environment variable that selects the orchestrator's tier.
pub const ORCHESTRATOR_MODEL_VAR: &str = "ORCHESTRATOR_MODEL";

/// Capability tier, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Fast and cheap.
    #[default]
    Haiku,
    /// Balanced.
    Sonnet,
    /// Most capable.
    Opus,
}

impl ModelTier {
    pub const ALL: [ModelTier; 3] = [ModelTier::Haiku, ModelTier::Sonnet, ModelTier::Opus];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelTier::Haiku => "haiku",
            ModelTier::Sonnet => "sonnet",
            ModelTier::Opus => "opus",
        }
    }

    /// Parse a tier name, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|tier| tier.as_str() == value)
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Model choice for a sub-agent: a concrete tier or the parent's model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentModel {
    Haiku,
    Sonnet,
    Opus,
    Inherit,
}

impl AgentModel {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentModel::Haiku => "haiku",
            AgentModel::Sonnet => "sonnet",
            AgentModel::Opus => "opus",
            AgentModel::Inherit => "inherit",
        }
    }

    /// Parse a sub-agent model name (tiers plus `inherit`).
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("inherit") {
            return Some(AgentModel::Inherit);
        }
        ModelTier::parse(value).map(Self::from)
    }

    /// Concrete tier, or `None` when inheriting.
    pub fn tier(self) -> Option<ModelTier> {
        match self {
            AgentModel::Haiku => Some(ModelTier::Haiku),
            AgentModel::Sonnet => Some(ModelTier::Sonnet),
            AgentModel::Opus => Some(ModelTier::Opus),
            AgentModel::Inherit => None,
        }
    }
}

impl From<ModelTier> for AgentModel {
    fn from(tier: ModelTier) -> Self {
        match tier {
            ModelTier::Haiku => AgentModel::Haiku,
            ModelTier::Sonnet => AgentModel::Sonnet,
            ModelTier::Opus => AgentModel::Opus,
        }
    }
}

impl fmt::Display for AgentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Read-only table of per-agent default models.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDefaults {
    models: BTreeMap<String, AgentModel>,
}

impl ModelDefaults {
    /// Defaults shipped with orca: only the coding agent runs on sonnet.
    pub fn standard() -> Self {
        Self::default()
            .with("linear", AgentModel::Haiku)
            .with("coding", AgentModel::Sonnet)
            .with("github", AgentModel::Haiku)
            .with("slack", AgentModel::Haiku)
    }

    pub fn with(mut self, agent: impl Into<String>, model: AgentModel) -> Self {
        self.models.insert(agent.into(), model);
        self
    }

    pub fn get(&self, agent: &str) -> Option<AgentModel> {
        self.models.get(agent).copied()
    }
}

/// Name of the override variable for a sub-agent, e.g. `CODING_AGENT_MODEL`.
pub fn agent_model_var(agent: &str) -> String {
    format!("{}_AGENT_MODEL", agent.to_uppercase())
}

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Resolves model tiers from overrides and an injected defaults table.
#[derive(Clone)]
pub struct ModelResolver {
    defaults: ModelDefaults,
    lookup: Arc<Lookup>,
}

impl ModelResolver {
    /// Resolver reading overrides from the process environment.
    pub fn new(defaults: ModelDefaults) -> Self {
        Self::with_lookup(defaults, |name| std::env::var(name).ok())
    }

    /// Resolver reading overrides through `lookup` instead of the environment.
    pub fn with_lookup(
        defaults: ModelDefaults,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            defaults,
            lookup: Arc::new(lookup),
        }
    }

    pub fn defaults(&self) -> &ModelDefaults {
        &self.defaults
    }

    /// Model for a sub-agent, honouring `{AGENT}_AGENT_MODEL`.
    pub fn resolve(&self, agent: &str) -> AgentModel {
        let var = agent_model_var(agent);
        let value = (self.lookup)(&var);
        self.resolve_value(agent, value.as_deref())
    }

    /// Model for a sub-agent given an explicit override value.
    ///
    /// Falls back to the registered default, then to the cheapest tier.
    pub fn resolve_value(&self, agent: &str, value: Option<&str>) -> AgentModel {
        if let Some(model) = value.and_then(AgentModel::parse) {
            return model;
        }
        warn_unrecognized(agent, value);
        self.defaults
            .get(agent)
            .unwrap_or_else(|| ModelTier::default().into())
    }

    /// Tier for the orchestrator, honouring `ORCHESTRATOR_MODEL`.
    pub fn orchestrator(&self) -> ModelTier {
        let value = (self.lookup)(ORCHESTRATOR_MODEL_VAR);
        self.orchestrator_value(value.as_deref())
    }

    /// Tier for the orchestrator given an explicit override value.
    ///
    /// `inherit` is not accepted: the orchestrator has no parent.
    pub fn orchestrator_value(&self, value: Option<&str>) -> ModelTier {
        if let Some(tier) = value.and_then(ModelTier::parse) {
            return tier;
        }
        warn_unrecognized("orchestrator", value);
        ModelTier::default()
    }
}

impl fmt::Debug for ModelResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelResolver")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

fn warn_unrecognized(agent: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
        tracing::warn!(agent, value, "Ignoring unrecognized model override");
    }
}
