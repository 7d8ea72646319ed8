//! orca-security: Session security policy, settings persistence, and the
//! pre-execution command hook.

pub mod grant;
pub mod hook;
pub mod policy;
pub mod settings;

pub use grant::{FileTool, PermissionGrant, SESSION_SCOPE, SHELL_TOOL};
pub use hook::{
    CommandAllowlist, CommandValidator, HookDecision, HookInput, HookMatcher, PRE_TOOL_USE,
};
pub use policy::{PermissionMode, PolicyViolation, SandboxSettings, SecurityPolicy};
pub use settings::{
    load, persist, PermissionsSettings, SecuritySettings, SettingsError, SETTINGS_FILE_NAME,
};
