//! MCP server descriptors handed to the runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// MCP server launch descriptor, either a subprocess or an HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpServer {
    /// Stdio MCP server (subprocess)
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        env: BTreeMap<String, String>,
    },
    /// HTTP MCP server
    Http {
        url: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
    },
}

impl McpServer {
    pub fn stdio<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        McpServer::Stdio {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
        }
    }

    pub fn http(url: impl Into<String>, headers: BTreeMap<String, String>) -> Self {
        McpServer::Http {
            url: url.into(),
            headers,
        }
    }

    /// Human-readable endpoint for logs: the URL or the command line.
    pub fn endpoint(&self) -> String {
        match self {
            McpServer::Stdio { command, args, .. } if args.is_empty() => command.clone(),
            McpServer::Stdio { command, args, .. } => format!("{command} {}", args.join(" ")),
            McpServer::Http { url, .. } => url.clone(),
        }
    }

    /// Copy with environment and header values masked.
    pub fn redacted(&self) -> Self {
        let mask = |values: &BTreeMap<String, String>| -> BTreeMap<String, String> {
            values
                .keys()
                .map(|key| (key.clone(), "***".to_string()))
                .collect()
        };
        match self {
            McpServer::Stdio { command, args, env } => McpServer::Stdio {
                command: command.clone(),
                args: args.clone(),
                env: mask(env),
            },
            McpServer::Http { url, headers } => McpServer::Http {
                url: url.clone(),
                headers: mask(headers),
            },
        }
    }
}
