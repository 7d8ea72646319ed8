//! Permission grant patterns for the declarative allow-list.

use std::fmt;
use std::path::{Component, Path};

/// Recursive wildcard rooted at the session directory.
pub const SESSION_SCOPE: &str = "./**";

/// Name of the shell execution tool in the runtime.
pub const SHELL_TOOL: &str = "Bash";

/// File tools whose grants carry a path scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileTool {
    Read,
    Write,
    Edit,
    MultiEdit,
    NotebookEdit,
    Glob,
    Grep,
}

impl FileTool {
    /// Every runtime tool that reads or writes files.
    pub const ALL: [FileTool; 7] = [
        FileTool::Read,
        FileTool::Write,
        FileTool::Edit,
        FileTool::MultiEdit,
        FileTool::NotebookEdit,
        FileTool::Glob,
        FileTool::Grep,
    ];

    /// File tools granted to a session, in the order grants are emitted.
    pub const SESSION: [FileTool; 5] = [
        FileTool::Read,
        FileTool::Write,
        FileTool::Edit,
        FileTool::Glob,
        FileTool::Grep,
    ];

    /// Tool name as the runtime spells it.
    pub fn name(self) -> &'static str {
        match self {
            FileTool::Read => "Read",
            FileTool::Write => "Write",
            FileTool::Edit => "Edit",
            FileTool::MultiEdit => "MultiEdit",
            FileTool::NotebookEdit => "NotebookEdit",
            FileTool::Glob => "Glob",
            FileTool::Grep => "Grep",
        }
    }

    #[cfg(test)]
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }
}

/// One entry of the permission allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionGrant {
    /// File operation limited to a path pattern. An empty scope is a bare,
    /// unscoped grant such as `Read`.
    File { tool: FileTool, scope: String },
    /// Shell execution with any arguments (`Bash(*)`).
    Shell,
    /// A tool identifier, or a `*`-suffixed family of identifiers.
    Tool(String),
}

impl PermissionGrant {
    /// File grant covering everything below the session directory.
    pub fn session_file(tool: FileTool) -> Self {
        PermissionGrant::File {
            tool,
            scope: SESSION_SCOPE.to_string(),
        }
    }

    /// Parse a grant from its settings-file spelling.
    #[cfg(test)]
    pub(crate) fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();
        let (name, scope) = match pattern.split_once('(') {
            Some((name, rest)) => match rest.strip_suffix(')') {
                Some(scope) => (name, Some(scope)),
                None => return PermissionGrant::Tool(pattern.to_string()),
            },
            None => (pattern, None),
        };

        if name == SHELL_TOOL && scope == Some("*") {
            return PermissionGrant::Shell;
        }
        match FileTool::from_name(name) {
            Some(tool) => PermissionGrant::File {
                tool,
                scope: scope.unwrap_or_default().to_string(),
            },
            None => PermissionGrant::Tool(pattern.to_string()),
        }
    }

    /// Whether this grant lets an agent run shell commands, scoped or not.
    pub fn is_shell(&self) -> bool {
        match self {
            PermissionGrant::Shell => true,
            PermissionGrant::Tool(name) => {
                name == SHELL_TOOL || name.starts_with(&format!("{SHELL_TOOL}("))
            }
            PermissionGrant::File { .. } => false,
        }
    }

    /// Whether a file grant stays inside the session directory.
    ///
    /// Non-file grants are not path scoped and always return `true`.
    pub fn is_session_scoped(&self) -> bool {
        match self {
            PermissionGrant::File { scope, .. } => scope_within_session(scope),
            PermissionGrant::Shell | PermissionGrant::Tool(_) => true,
        }
    }
}

impl fmt::Display for PermissionGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionGrant::File { tool, scope } if scope.is_empty() => f.write_str(tool.name()),
            PermissionGrant::File { tool, scope } => write!(f, "{}({scope})", tool.name()),
            PermissionGrant::Shell => write!(f, "{SHELL_TOOL}(*)"),
            PermissionGrant::Tool(name) => f.write_str(name),
        }
    }
}

/// A scope is inside the session directory when it is written relative to it
/// (`.` or `./...`) and never climbs out with `..`.
fn scope_within_session(scope: &str) -> bool {
    if scope != "." && !scope.starts_with("./") {
        return false;
    }
    Path::new(scope).components().all(|component| {
        matches!(component, Component::CurDir | Component::Normal(_))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_file_grant_display() {
        let grant = PermissionGrant::session_file(FileTool::Read);
        assert_eq!(grant.to_string(), "Read(./**)");
        assert!(grant.is_session_scoped());
        assert!(!grant.is_shell());
    }

    #[test]
    fn test_shell_grant_display_and_parse() {
        assert_eq!(PermissionGrant::Shell.to_string(), "Bash(*)");
        assert_eq!(PermissionGrant::parse("Bash(*)"), PermissionGrant::Shell);
        assert!(PermissionGrant::parse("Bash(git:*)").is_shell());
        assert!(PermissionGrant::parse("Bash").is_shell());
    }

    #[test]
    fn test_parse_file_grants() {
        assert_eq!(
            PermissionGrant::parse("Edit(./src/**)"),
            PermissionGrant::File {
                tool: FileTool::Edit,
                scope: "./src/**".to_string(),
            }
        );
        assert_eq!(
            PermissionGrant::parse("Grep"),
            PermissionGrant::File {
                tool: FileTool::Grep,
                scope: String::new(),
            }
        );
    }

    #[test]
    fn test_every_file_writing_tool_is_path_scoped() {
        for tool in FileTool::ALL {
            assert!(matches!(
                PermissionGrant::parse(&format!("{}(/**)", tool.name())),
                PermissionGrant::File { .. }
            ));
        }
        assert_eq!(
            PermissionGrant::parse("NotebookEdit(/etc/**)"),
            PermissionGrant::File {
                tool: FileTool::NotebookEdit,
                scope: "/etc/**".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_tool_grants() {
        assert_eq!(
            PermissionGrant::parse("mcp__playwright__browser_click"),
            PermissionGrant::Tool("mcp__playwright__browser_click".to_string())
        );
        assert_eq!(
            PermissionGrant::parse("mcp__gateway__*"),
            PermissionGrant::Tool("mcp__gateway__*".to_string())
        );
    }

    #[test]
    fn test_scopes_outside_session_are_rejected() {
        for pattern in [
            "Read(/etc/**)",
            "Write(**)",
            "Edit(../**)",
            "Glob(./../**)",
            "Grep(./src/../../**)",
            "Read(~/.ssh/**)",
            "Write",
            "NotebookEdit(/etc/**)",
            "MultiEdit(/**)",
        ] {
            let grant = PermissionGrant::parse(pattern);
            assert!(!grant.is_session_scoped(), "{pattern} should be rejected");
        }
    }

    #[test]
    fn test_scopes_inside_session_are_accepted() {
        for pattern in ["Read(./**)", "Write(./src/**)", "Glob(.)", "MultiEdit(./src/**)"] {
            assert!(PermissionGrant::parse(pattern).is_session_scoped(), "{pattern}");
        }
    }
}
