//! Security policy: sandbox, declarative grants, and the command hook.
//!
//! The declarative layer cannot say "any command, but only these binaries",
//! so the shell grant is broad and the command hook does the narrowing. The
//! two are always installed together.

use crate::grant::{FileTool, PermissionGrant};
use crate::hook::{CommandValidator, HookMatcher};
use crate::settings::{PermissionsSettings, SecuritySettings};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default handling for tool calls not covered by a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    /// Auto-accept file edits, prompt for everything else.
    #[default]
    AcceptEdits,
    /// Accept every tool call.
    AcceptAll,
    /// Reject every tool call not explicitly granted.
    Reject,
    /// Ask for every tool call not explicitly granted.
    Ask,
}

/// OS-level isolation of shell commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SandboxSettings {
    /// Run shell commands inside the sandbox.
    pub enabled: bool,
    /// Skip the interactive prompt for shell commands that run sandboxed.
    pub auto_allow_bash_if_sandboxed: bool,
}

/// Ways a policy can break its own invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("grant '{0}' is not scoped under the session directory")]
    UnscopedFileGrant(String),

    #[error("shell execution is granted but no command validation hook is registered")]
    ShellWithoutHook,

    #[error("a command validation hook is registered but shell execution is not granted")]
    HookWithoutShell,
}

/// The three-layer security policy for one session.
#[derive(Clone)]
pub struct SecurityPolicy {
    sandbox: SandboxSettings,
    default_mode: PermissionMode,
    grants: Vec<PermissionGrant>,
    hook: Option<Arc<dyn CommandValidator>>,
}

impl SecurityPolicy {
    /// Build the session policy.
    ///
    /// The shape is fixed and takes no environment input: sandbox on,
    /// sandboxed shell auto-allowed, `acceptEdits`, file tools scoped to the
    /// session directory, shell granted and guarded by `hook`, every browser
    /// tool, and one aggregate grant for the gateway tools.
    pub fn build<I, S>(
        hook: Arc<dyn CommandValidator>,
        browser_tools: I,
        gateway_grant: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut grants: Vec<PermissionGrant> = FileTool::SESSION
            .into_iter()
            .map(PermissionGrant::session_file)
            .collect();
        grants.push(PermissionGrant::Shell);
        grants.extend(browser_tools.into_iter().map(|tool| PermissionGrant::Tool(tool.into())));
        grants.push(PermissionGrant::Tool(gateway_grant.into()));

        Self {
            sandbox: SandboxSettings {
                enabled: true,
                auto_allow_bash_if_sandboxed: true,
            },
            default_mode: PermissionMode::AcceptEdits,
            grants,
            hook: Some(hook),
        }
    }

    /// Assemble a policy from arbitrary parts. Call [`SecurityPolicy::validate`]
    /// before using one built this way.
    #[cfg(test)]
    pub(crate) fn from_parts(
        sandbox: SandboxSettings,
        default_mode: PermissionMode,
        grants: Vec<PermissionGrant>,
        hook: Option<Arc<dyn CommandValidator>>,
    ) -> Self {
        Self {
            sandbox,
            default_mode,
            grants,
            hook,
        }
    }

    /// Check that file grants stay in the session directory and that the
    /// shell grant and the command hook are present together.
    pub fn validate(&self) -> Result<(), PolicyViolation> {
        if let Some(grant) = self.grants.iter().find(|grant| !grant.is_session_scoped()) {
            return Err(PolicyViolation::UnscopedFileGrant(grant.to_string()));
        }
        match (self.has_shell_grant(), self.hook.is_some()) {
            (true, false) => Err(PolicyViolation::ShellWithoutHook),
            (false, true) => Err(PolicyViolation::HookWithoutShell),
            _ => Ok(()),
        }
    }

    pub fn sandbox(&self) -> SandboxSettings {
        self.sandbox
    }

    pub fn default_mode(&self) -> PermissionMode {
        self.default_mode
    }

    pub fn grants(&self) -> &[PermissionGrant] {
        &self.grants
    }

    pub fn hook(&self) -> Option<&Arc<dyn CommandValidator>> {
        self.hook.as_ref()
    }

    pub fn has_shell_grant(&self) -> bool {
        self.grants.iter().any(PermissionGrant::is_shell)
    }

    /// Grant patterns as written to the settings file.
    pub fn allow_patterns(&self) -> Vec<String> {
        self.grants.iter().map(ToString::to_string).collect()
    }

    /// Hook matchers to register on the `PreToolUse` path.
    pub fn hook_matchers(&self) -> Vec<HookMatcher> {
        self.hook
            .iter()
            .map(|hook| HookMatcher::shell(Arc::clone(hook)))
            .collect()
    }

    /// Serializable view for the runtime's settings file.
    pub fn to_settings(&self) -> SecuritySettings {
        SecuritySettings {
            sandbox: self.sandbox,
            permissions: PermissionsSettings {
                default_mode: self.default_mode,
                allow: self.allow_patterns(),
            },
        }
    }
}

impl fmt::Debug for SecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityPolicy")
            .field("sandbox", &self.sandbox)
            .field("default_mode", &self.default_mode)
            .field("grants", &self.allow_patterns())
            .field("hook", &self.hook.as_ref().map(|hook| hook.name()))
            .finish()
    }
}
