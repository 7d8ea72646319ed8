//! End-to-end bootstrap tests.
//!
//! These run the full bootstrap against temporary directories without a
//! runtime or network access.

use orca_core::gateway::{GATEWAY_API_KEY_VAR, GATEWAY_URL_VAR};
use orca_core::prompts::{AGENT_PROMPT_FILES, ORCHESTRATOR_PROMPT_FILE};
use orca_core::{
    AgentModel, BootstrapOptions, GatewayConfig, GatewaySettings, ModelDefaults, ModelResolver,
    ModelTier, OrcaError, SessionBootstrapper,
};
use orca_security::{
    CommandAllowlist, CommandValidator, HookInput, PermissionMode, SecuritySettings,
    PRE_TOOL_USE, SETTINGS_FILE_NAME,
};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn write_prompts(dir: &Path) {
    for (agent, file) in AGENT_PROMPT_FILES {
        fs::write(dir.join(file), format!("# {agent} agent\n")).unwrap();
    }
    fs::write(dir.join(ORCHESTRATOR_PROMPT_FILE), "# orchestrator\n").unwrap();
}

fn gateway() -> GatewayConfig {
    GatewayConfig::from_lookup(&GatewaySettings::default(), |name| match name {
        GATEWAY_URL_VAR => Some("https://gateway.example/mcp".to_string()),
        GATEWAY_API_KEY_VAR => Some("test-key".to_string()),
        _ => None,
    })
}

fn resolver(vars: &[(&str, &str)]) -> ModelResolver {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ModelResolver::with_lookup(ModelDefaults::standard(), move |name| vars.get(name).cloned())
}

fn options(prompts: &Path) -> BootstrapOptions {
    let validator: Arc<dyn CommandValidator> =
        Arc::new(CommandAllowlist::new(["ls", "cat", "git", "npm"]));
    BootstrapOptions::new(prompts, gateway(), validator).with_resolver(resolver(&[]))
}

#[test]
fn test_bootstrap_writes_scoped_settings() {
    let prompts = tempfile::tempdir().unwrap();
    write_prompts(prompts.path());
    let session = tempfile::tempdir().unwrap();

    let config = SessionBootstrapper::new(options(prompts.path()))
        .bootstrap(session.path(), Some(ModelTier::Haiku))
        .unwrap();

    let settings_path = session.path().join(SETTINGS_FILE_NAME);
    assert!(settings_path.exists());
    let settings = orca_security::load(&settings_path).unwrap();
    assert!(settings.sandbox.enabled);
    assert!(settings.sandbox.auto_allow_bash_if_sandboxed);
    assert_eq!(settings.permissions.default_mode, PermissionMode::AcceptEdits);
    for file_tool in ["Read", "Write", "Edit", "Glob", "Grep"] {
        assert!(settings
            .permissions
            .allow
            .contains(&format!("{file_tool}(./**)")));
    }
    assert!(settings.permissions.allow.contains(&"Bash(*)".to_string()));
    assert!(settings
        .permissions
        .allow
        .contains(&"mcp__gateway__*".to_string()));

    // shell grant comes with exactly one shell hook
    assert_eq!(config.hooks[PRE_TOOL_USE].len(), 1);

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&settings_path).unwrap()).unwrap();
    let validator = jsonschema::validator_for(&SecuritySettings::schema()).unwrap();
    assert!(validator.is_valid(&raw));
}

#[test]
fn test_bootstrap_provisions_prompts_idempotently() {
    let prompts = tempfile::tempdir().unwrap();
    write_prompts(prompts.path());
    let session = tempfile::tempdir().unwrap();
    let bootstrapper = SessionBootstrapper::new(options(prompts.path()));

    bootstrapper.bootstrap(session.path(), Some(ModelTier::Haiku)).unwrap();
    fs::write(prompts.path().join("coding_agent_prompt.md"), "# revised\n").unwrap();
    bootstrapper.bootstrap(session.path(), Some(ModelTier::Haiku)).unwrap();

    let copied = session.path().join(".prompts").join("coding_agent_prompt.md");
    assert_eq!(fs::read_to_string(copied).unwrap(), "# revised\n");
}

#[test]
fn test_uncreatable_session_dir_is_fatal() {
    let prompts = tempfile::tempdir().unwrap();
    write_prompts(prompts.path());
    let root = tempfile::tempdir().unwrap();
    let blocker = root.path().join("blocker");
    fs::write(&blocker, "regular file").unwrap();
    let session = blocker.join("session");

    let err = SessionBootstrapper::new(options(prompts.path()))
        .bootstrap(&session, Some(ModelTier::Haiku))
        .unwrap_err();

    assert!(matches!(err, OrcaError::Prompt { .. }));
    assert!(!session.join(SETTINGS_FILE_NAME).exists());
}

#[test]
fn test_missing_prompt_file_is_fatal() {
    let prompts = tempfile::tempdir().unwrap();
    write_prompts(prompts.path());
    fs::remove_file(prompts.path().join("slack_agent_prompt.md")).unwrap();
    let session = tempfile::tempdir().unwrap();

    let err = SessionBootstrapper::new(options(prompts.path()))
        .bootstrap(session.path(), Some(ModelTier::Haiku))
        .unwrap_err();
    assert!(matches!(err, OrcaError::Prompt { .. }));
    assert!(err.to_string().contains("slack_agent_prompt.md"));
    assert!(!session.path().join(SETTINGS_FILE_NAME).exists());
}

#[test]
fn test_agent_model_overrides() {
    let prompts = tempfile::tempdir().unwrap();
    write_prompts(prompts.path());
    let session = tempfile::tempdir().unwrap();
    let options = options(prompts.path()).with_resolver(resolver(&[
        ("CODING_AGENT_MODEL", "opus"),
        ("LINEAR_AGENT_MODEL", "bogus"),
        ("ORCHESTRATOR_MODEL", " SONNET "),
    ]));

    let config = SessionBootstrapper::new(options)
        .bootstrap(session.path(), None)
        .unwrap();

    assert_eq!(config.model, ModelTier::Sonnet);

    let model = |name: &str| config.agents.get(name).unwrap().model();
    assert_eq!(model("coding"), AgentModel::Opus);
    assert_eq!(model("linear"), AgentModel::Haiku);
    assert_eq!(model("github"), AgentModel::Haiku);
    assert_eq!(model("slack"), AgentModel::Haiku);
}

#[test]
fn test_denied_command_does_not_stop_later_calls() {
    let prompts = tempfile::tempdir().unwrap();
    write_prompts(prompts.path());
    let session = tempfile::tempdir().unwrap();
    let config = SessionBootstrapper::new(options(prompts.path()))
        .bootstrap(session.path(), Some(ModelTier::Haiku))
        .unwrap();
    let hook = &config.hooks[PRE_TOOL_USE][0];

    let call = |command: &str| -> HookInput {
        serde_json::from_value(json!({
            "tool_name": "Bash",
            "tool_input": {"command": command},
            "hook_event_name": PRE_TOOL_USE,
        }))
        .unwrap()
    };

    let denied = hook.evaluate(&call("rm -rf /"));
    assert!(!denied.is_allowed());
    assert!(denied.reason().unwrap().contains("rm"));
    let output = denied.to_hook_output();
    assert_eq!(output["hookSpecificOutput"]["permissionDecision"], "deny");

    assert!(hook.evaluate(&call("git status && ls -la")).is_allowed());

    for smuggled in ["cat README.md > >(rm -rf ./src)", "ls $'\\'' ; rm -rf / #'"] {
        assert!(!hook.evaluate(&call(smuggled)).is_allowed(), "{smuggled}");
    }
    assert!(hook.evaluate(&call("ls -la")).is_allowed());
}

#[test]
fn test_payload_limit_enforced() {
    let prompts = tempfile::tempdir().unwrap();
    write_prompts(prompts.path());
    let session = tempfile::tempdir().unwrap();

    let err = SessionBootstrapper::new(options(prompts.path()).with_transport_limit(512))
        .bootstrap(session.path(), Some(ModelTier::Haiku))
        .unwrap_err();
    match err {
        OrcaError::PayloadTooLarge { actual, limit } => {
            assert_eq!(limit, 512);
            assert!(actual > limit);
        }
        other => panic!("unexpected error: {other}"),
    }
}
