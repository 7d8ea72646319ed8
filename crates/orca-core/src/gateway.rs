//! Tool gateway configuration.
//!
//! The gateway aggregates the issue-tracking, version-control, and messaging
//! providers behind a single MCP endpoint. orca only needs its address,
//! credentials, and the tool names each provider declares.

use crate::mcp::McpServer;
use crate::tools::BROWSER_SERVER;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const GATEWAY_URL_VAR: &str = "ORCA_GATEWAY_URL";
pub const GATEWAY_API_KEY_VAR: &str = "ORCA_GATEWAY_API_KEY";
pub const GATEWAY_USER_ID_VAR: &str = "ORCA_GATEWAY_USER_ID";

/// MCP server name the gateway is registered under.
pub const DEFAULT_GATEWAY_NAME: &str = "gateway";

/// Tool names each gateway provider declares, without the `mcp__` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayTools {
    pub issue_tracking: Vec<String>,
    pub version_control: Vec<String>,
    pub messaging: Vec<String>,
}

impl Default for GatewayTools {
    fn default() -> Self {
        let owned = |names: &[&str]| -> Vec<String> {
            names.iter().map(|name| name.to_string()).collect()
        };
        Self {
            issue_tracking: owned(&[
                "Linear_WhoAmI",
                "Linear_ListTeams",
                "Linear_ListProjects",
                "Linear_ListIssues",
                "Linear_GetIssue",
                "Linear_CreateIssue",
                "Linear_UpdateIssue",
                "Linear_AddComment",
            ]),
            version_control: owned(&[
                "Github_GetRepository",
                "Github_ListPullRequests",
                "Github_GetPullRequest",
                "Github_CreatePullRequest",
                "Github_CreateIssueComment",
            ]),
            messaging: owned(&[
                "Slack_ListConversations",
                "Slack_GetMessages",
                "Slack_SendMessage",
            ]),
        }
    }
}

/// Gateway section of the config file. Credentials are never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub name: String,
    /// Used when `ORCA_GATEWAY_URL` is unset.
    pub url: Option<String>,
    pub tools: GatewayTools,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_GATEWAY_NAME.to_string(),
            url: None,
            tools: GatewayTools::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("{0} is not set. The gateway URL and API key are required to start a session.")]
    MissingVar(&'static str),

    #[error("Invalid gateway URL '{0}': expected an http:// or https:// URL")]
    InvalidUrl(String),

    #[error("Invalid gateway name '{0}': use ASCII letters, digits, '-' or '_'")]
    InvalidName(String),

    #[error("Gateway name '{0}' is reserved for another MCP server")]
    ReservedName(String),

    #[error("Gateway declares no {0} tools")]
    NoTools(&'static str),
}

/// Resolved gateway endpoint and tool declarations.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub name: String,
    pub url: String,
    pub api_key: String,
    pub user_id: Option<String>,
    pub tools: GatewayTools,
}

impl GatewayConfig {
    /// Read credentials from the process environment.
    pub fn from_env(settings: &GatewaySettings) -> Self {
        Self::from_lookup(settings, |name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`. Missing values are left empty and
    /// reported by [`GatewayConfig::validate`].
    pub fn from_lookup(settings: &GatewaySettings, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |value: Option<String>| {
            value
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            name: settings.name.clone(),
            url: non_empty(lookup(GATEWAY_URL_VAR))
                .or_else(|| non_empty(settings.url.clone()))
                .unwrap_or_default(),
            api_key: non_empty(lookup(GATEWAY_API_KEY_VAR)).unwrap_or_default(),
            user_id: non_empty(lookup(GATEWAY_USER_ID_VAR)),
            tools: settings.tools.clone(),
        }
    }

    /// Check the configuration before anything touches the filesystem.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let valid_name = !self.name.is_empty()
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_name {
            return Err(GatewayError::InvalidName(self.name.clone()));
        }
        if self.name == BROWSER_SERVER {
            return Err(GatewayError::ReservedName(self.name.clone()));
        }
        if self.url.is_empty() {
            return Err(GatewayError::MissingVar(GATEWAY_URL_VAR));
        }
        if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            return Err(GatewayError::InvalidUrl(self.url.clone()));
        }
        if self.api_key.is_empty() {
            return Err(GatewayError::MissingVar(GATEWAY_API_KEY_VAR));
        }
        for (kind, tools) in [
            ("issue-tracking", &self.tools.issue_tracking),
            ("version-control", &self.tools.version_control),
            ("messaging", &self.tools.messaging),
        ] {
            if tools.is_empty() {
                return Err(GatewayError::NoTools(kind));
            }
        }
        Ok(())
    }

    /// Fully qualified runtime identifier for a gateway tool.
    pub fn qualified(&self, tool: &str) -> String {
        format!("mcp__{}__{tool}", self.name)
    }

    pub fn issue_tracking_tools(&self) -> Vec<String> {
        self.qualify_all(&self.tools.issue_tracking)
    }

    pub fn version_control_tools(&self) -> Vec<String> {
        self.qualify_all(&self.tools.version_control)
    }

    pub fn messaging_tools(&self) -> Vec<String> {
        self.qualify_all(&self.tools.messaging)
    }

    /// Single permission pattern covering every gateway tool.
    pub fn permission_pattern(&self) -> String {
        self.qualified("*")
    }

    /// MCP descriptor the runtime uses to reach the gateway.
    pub fn server(&self) -> McpServer {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {}", self.api_key));
        if let Some(user_id) = &self.user_id {
            headers.insert("X-User-Id".to_string(), user_id.clone());
        }
        McpServer::http(self.url.clone(), headers)
    }

    fn qualify_all(&self, tools: &[String]) -> Vec<String> {
        tools.iter().map(|tool| self.qualified(tool)).collect()
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("api_key", &"***")
            .field("user_id", &self.user_id)
            .field("tools", &self.tools)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> GatewayConfig {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        GatewayConfig::from_lookup(&GatewaySettings::default(), |name| {
            vars.get(name).map(|value| value.to_string())
        })
    }

    fn valid() -> GatewayConfig {
        config_from(&[
            (GATEWAY_URL_VAR, "https://gateway.example/mcp"),
            (GATEWAY_API_KEY_VAR, "key-123"),
        ])
    }

    #[test]
    fn test_valid_config() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn test_missing_url_and_key() {
        assert_eq!(
            config_from(&[(GATEWAY_API_KEY_VAR, "k")]).validate(),
            Err(GatewayError::MissingVar(GATEWAY_URL_VAR))
        );
        assert_eq!(
            config_from(&[(GATEWAY_URL_VAR, "https://g.example"), (GATEWAY_API_KEY_VAR, "  ")])
                .validate(),
            Err(GatewayError::MissingVar(GATEWAY_API_KEY_VAR))
        );
    }

    #[test]
    fn test_settings_url_is_fallback() {
        let settings = GatewaySettings {
            url: Some("https://configured.example".to_string()),
            ..Default::default()
        };
        let config = GatewayConfig::from_lookup(&settings, |name| {
            (name == GATEWAY_API_KEY_VAR).then(|| "k".to_string())
        });
        assert_eq!(config.url, "https://configured.example");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_invalid_url_and_name() {
        let mut config = valid();
        config.url = "ftp://gateway".to_string();
        assert!(matches!(config.validate(), Err(GatewayError::InvalidUrl(_))));

        let mut config = valid();
        config.name = "bad name".to_string();
        assert!(matches!(config.validate(), Err(GatewayError::InvalidName(_))));
    }

    #[test]
    fn test_browser_server_name_is_reserved() {
        let mut config = valid();
        config.name = BROWSER_SERVER.to_string();
        assert_eq!(
            config.validate(),
            Err(GatewayError::ReservedName("playwright".to_string()))
        );
    }

    #[test]
    fn test_empty_tool_list_rejected() {
        let mut config = valid();
        config.tools.messaging.clear();
        assert_eq!(config.validate(), Err(GatewayError::NoTools("messaging")));
    }

    #[test]
    fn test_qualified_names_and_pattern() {
        let config = valid();
        assert_eq!(config.permission_pattern(), "mcp__gateway__*");
        assert!(config
            .issue_tracking_tools()
            .iter()
            .all(|tool| tool.starts_with("mcp__gateway__Linear_")));
    }

    #[test]
    fn test_server_descriptor_carries_credentials() {
        let mut config = valid();
        config.user_id = Some("ops@example.com".to_string());
        let json = serde_json::to_value(config.server()).unwrap();
        assert_eq!(json["type"], "http");
        assert_eq!(json["url"], "https://gateway.example/mcp");
        assert_eq!(json["headers"]["Authorization"], "Bearer key-123");
        assert_eq!(json["headers"]["X-User-Id"], "ops@example.com");
    }

    #[test]
    fn test_debug_hides_api_key() {
        assert!(!format!("{:?}", valid()).contains("key-123"));
    }
}
