//! Pre-execution command validation.
//!
//! The runtime checks permissions first, then runs the hooks registered for
//! `PreToolUse`, and only then hands an allowed command to the sandbox. A hook
//! is a pure decision over the literal command text: it must not block or
//! touch the filesystem, because it sits in front of every shell call.

use crate::grant::SHELL_TOOL;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Hook event name for checks that run before a tool executes.
pub const PRE_TOOL_USE: &str = "PreToolUse";

/// Outcome of validating one shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookDecision {
    Allow,
    Deny { reason: String },
}

impl HookDecision {
    pub fn deny(reason: impl Into<String>) -> Self {
        HookDecision::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, HookDecision::Allow)
    }

    /// Reason attached to a denial.
    pub fn reason(&self) -> Option<&str> {
        match self {
            HookDecision::Allow => None,
            HookDecision::Deny { reason } => Some(reason),
        }
    }

    /// Render the decision in the runtime's hook output format.
    ///
    /// An allow is an empty object so the runtime falls through to its normal
    /// permission flow.
    pub fn to_hook_output(&self) -> Value {
        match self {
            HookDecision::Allow => json!({}),
            HookDecision::Deny { reason } => json!({
                "hookSpecificOutput": {
                    "hookEventName": PRE_TOOL_USE,
                    "permissionDecision": "deny",
                    "permissionDecisionReason": reason,
                }
            }),
        }
    }
}

/// Decides whether a shell command may run.
///
/// Implementations must be deterministic for a given command and free of
/// side effects.
pub trait CommandValidator: Send + Sync {
    /// Short identifier used in diagnostics and launch payloads.
    fn name(&self) -> &str;

    /// Validate the literal command string the agent asked to run.
    fn validate(&self, command: &str) -> HookDecision;
}

/// Validator that only admits commands whose programs are on a fixed list.
///
/// Every segment of a compound command (`&&`, `||`, `;`, `|`, `&`, newline)
/// must start with an allowed program. Leading `VAR=value` assignments are
/// skipped and programs are compared by basename, so `/usr/bin/git` matches
/// `git`. Command substitution, process substitution, and `$'...'` quoting
/// are denied anywhere in the command, quoted or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandAllowlist {
    allowed: BTreeSet<String>,
}

impl CommandAllowlist {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = commands
            .into_iter()
            .map(|command| command.as_ref().trim().to_string())
            .filter(|command| !command.is_empty())
            .collect();
        Self { allowed }
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn contains(&self, program: &str) -> bool {
        self.allowed.contains(program)
    }

    /// Allowed program names in sorted order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

impl CommandValidator for CommandAllowlist {
    fn name(&self) -> &str {
        "command-allowlist"
    }

    fn validate(&self, command: &str) -> HookDecision {
        let command = command.trim();
        if command.is_empty() {
            return HookDecision::deny("Empty command");
        }
        if command.contains("$(") || command.contains('`') {
            return HookDecision::deny("Command substitution is not allowed");
        }
        if command.contains("<(") || command.contains(">(") {
            return HookDecision::deny("Process substitution is not allowed");
        }
        // Inside `$'...'` an escaped `\'` does not end the string; the segment
        // splitter does not model that.
        if command.contains("$'") {
            return HookDecision::deny("ANSI-C quoting ($'...') is not allowed");
        }

        let mut programs = 0usize;
        for segment in split_segments(command) {
            let words = match shell_words::split(segment) {
                Ok(words) => words,
                Err(e) => return HookDecision::deny(format!("Could not parse command: {e}")),
            };
            let Some(program) = program_name(&words) else {
                continue;
            };
            if !self.contains(program) {
                return HookDecision::deny(format!(
                    "Command '{program}' is not in the allowed commands list"
                ));
            }
            programs += 1;
        }

        if programs == 0 {
            return HookDecision::deny("No command found");
        }
        HookDecision::Allow
    }
}

/// Split a compound command on shell control operators outside quotes.
///
/// Redirections such as `2>&1` and `&>file` are not treated as separators.
fn split_segments(command: &str) -> Vec<&str> {
    let bytes = command.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for (i, &byte) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if !in_single => escaped = true,
            b'\'' if !in_double => in_single = !in_single,
            b'"' if !in_single => in_double = !in_double,
            _ if in_single || in_double => {}
            b';' | b'|' | b'\n' => {
                segments.push(&command[start..i]);
                start = i + 1;
            }
            b'&' => {
                let redirect_source = i > 0 && matches!(bytes[i - 1], b'>' | b'<');
                let redirect_target = bytes.get(i + 1) == Some(&b'>');
                if !redirect_source && !redirect_target {
                    segments.push(&command[start..i]);
                    start = i + 1;
                }
            }
            _ => {}
        }
    }
    segments.push(&command[start..]);
    segments
}

/// First word that is not an environment assignment, reduced to its basename.
fn program_name(words: &[String]) -> Option<&str> {
    let word = words.iter().find(|word| !is_assignment(word))?;
    Path::new(word.as_str())
        .file_name()
        .and_then(|name| name.to_str())
}

fn is_assignment(word: &str) -> bool {
    match word.split_once('=') {
        Some((name, _)) => {
            let mut chars = name.chars();
            matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
                && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Payload the runtime sends to a `PreToolUse` hook.
#[derive(Debug, Clone, Deserialize)]
pub struct HookInput {
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
    #[serde(default)]
    pub hook_event_name: Option<String>,
}

/// Binds a validator to the tool calls it guards.
#[derive(Clone)]
pub struct HookMatcher {
    matcher: String,
    validator: Arc<dyn CommandValidator>,
}

impl HookMatcher {
    /// Matcher guarding the shell tool.
    pub fn shell(validator: Arc<dyn CommandValidator>) -> Self {
        Self {
            matcher: SHELL_TOOL.to_string(),
            validator,
        }
    }

    /// Tool-name pattern this matcher applies to.
    pub fn matcher(&self) -> &str {
        &self.matcher
    }

    pub fn validator(&self) -> &Arc<dyn CommandValidator> {
        &self.validator
    }

    pub fn matches(&self, tool_name: &str) -> bool {
        self.matcher == tool_name
    }

    /// Evaluate a hook payload. Calls for other tools pass through.
    pub fn evaluate(&self, input: &HookInput) -> HookDecision {
        if !self.matches(&input.tool_name) {
            return HookDecision::Allow;
        }
        match input.tool_input.get("command").and_then(Value::as_str) {
            Some(command) => {
                let decision = self.validator.validate(command);
                if let HookDecision::Deny { reason } = &decision {
                    tracing::info!(command, reason = reason.as_str(), "Blocked shell command");
                }
                decision
            }
            None => HookDecision::deny("Shell tool call is missing a command"),
        }
    }
}

impl fmt::Debug for HookMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookMatcher")
            .field("matcher", &self.matcher)
            .field("validator", &self.validator.name())
            .finish()
    }
}
