//! Tool identifiers exposed to the orchestrator and its sub-agents.

use crate::gateway::GatewayConfig;
use crate::mcp::McpServer;

/// Built-in runtime tools available to the orchestrator.
pub const BUILTIN_TOOLS: &[&str] = &["Read", "Write", "Edit", "Glob", "Grep", "Bash"];

/// File tools every sub-agent receives so it can load its own instructions.
pub const FILE_TOOLS: &[&str] = &["Read", "Write", "Edit", "Glob"];

/// MCP server name of the browser automation provider.
pub const BROWSER_SERVER: &str = "playwright";

/// Browser automation tools.
pub const BROWSER_TOOLS: &[&str] = &[
    "mcp__playwright__browser_navigate",
    "mcp__playwright__browser_take_screenshot",
    "mcp__playwright__browser_click",
    "mcp__playwright__browser_type",
    "mcp__playwright__browser_select_option",
    "mcp__playwright__browser_hover",
    "mcp__playwright__browser_snapshot",
    "mcp__playwright__browser_wait_for",
    "mcp__playwright__browser_close",
];

/// Default launch descriptor for the browser automation server.
pub fn default_browser_server() -> McpServer {
    McpServer::stdio("npx", ["-y", "@playwright/mcp@latest"])
}

/// Insertion-ordered list of tool identifiers without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolList(Vec<String>);

impl ToolList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append tools, skipping any already present.
    pub fn with<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tool in tools {
            let tool = tool.as_ref();
            if !self.0.iter().any(|existing| existing == tool) {
                self.0.push(tool.to_string());
            }
        }
        self
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Tool lists declared by the browser and gateway providers.
///
/// orca does not know what the tools do; it only concatenates the names
/// each provider declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSurface {
    browser: Vec<String>,
    issue_tracking: Vec<String>,
    version_control: Vec<String>,
    messaging: Vec<String>,
}

impl ToolSurface {
    /// Surface for the standard browser tools and a configured gateway.
    pub fn new(gateway: &GatewayConfig) -> Self {
        Self {
            browser: BROWSER_TOOLS.iter().map(|tool| tool.to_string()).collect(),
            issue_tracking: gateway.issue_tracking_tools(),
            version_control: gateway.version_control_tools(),
            messaging: gateway.messaging_tools(),
        }
    }

    /// Surface from explicit provider lists.
    pub fn from_lists(
        browser: Vec<String>,
        issue_tracking: Vec<String>,
        version_control: Vec<String>,
        messaging: Vec<String>,
    ) -> Self {
        Self {
            browser,
            issue_tracking,
            version_control,
            messaging,
        }
    }

    pub fn browser_tools(&self) -> &[String] {
        &self.browser
    }

    pub fn issue_tracking_tools(&self) -> &[String] {
        &self.issue_tracking
    }

    pub fn version_control_tools(&self) -> &[String] {
        &self.version_control
    }

    pub fn messaging_tools(&self) -> &[String] {
        &self.messaging
    }

    /// Every gateway tool across the three providers.
    pub fn gateway_tools(&self) -> Vec<String> {
        ToolList::new()
            .with(&self.issue_tracking)
            .with(&self.version_control)
            .with(&self.messaging)
            .into_vec()
    }

    /// Tools for the coding agent: file tools, search, shell, and the browser.
    pub fn coding_tools(&self) -> Vec<String> {
        ToolList::new()
            .with(FILE_TOOLS)
            .with(["Grep", "Bash"])
            .with(&self.browser)
            .into_vec()
    }

    /// Full tool list for the orchestrator session.
    pub fn allowed_tools(&self) -> Vec<String> {
        ToolList::new()
            .with(BUILTIN_TOOLS)
            .with(&self.browser)
            .with(self.gateway_tools())
            .into_vec()
    }
}
