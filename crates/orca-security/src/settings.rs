//! On-disk security settings read by the sandboxed runtime.

use crate::policy::{PermissionMode, SandboxSettings, SecurityPolicy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File name of the settings file inside the session directory.
pub const SETTINGS_FILE_NAME: &str = ".claude_settings.json";

/// Wire format of the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SecuritySettings {
    pub sandbox: SandboxSettings,
    pub permissions: PermissionsSettings,
}

/// Permission section of the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsSettings {
    pub default_mode: PermissionMode,
    pub allow: Vec<String>,
}

impl SecuritySettings {
    /// JSON Schema describing the settings file.
    pub fn schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(SecuritySettings))
            .expect("schema serialization should not fail")
    }
}

/// Errors raised while writing or reading the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(
        "Failed to write security settings to {}: {source}\n\
         Check disk space and file permissions.\n\
         Agent cannot start without security settings.",
        path.display()
    )]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to read security settings from {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid security settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Write the policy to `<session_dir>/.claude_settings.json`.
///
/// The file is written to a temporary sibling, synced, and renamed into
/// place, so a failed write never leaves a partial settings file behind.
pub fn persist(session_dir: &Path, policy: &SecurityPolicy) -> Result<PathBuf, SettingsError> {
    let path = session_dir.join(SETTINGS_FILE_NAME);
    let content = serde_json::to_string_pretty(&policy.to_settings())?;

    fs::create_dir_all(session_dir)
        .and_then(|()| atomic_write(&path, content.as_bytes()))
        .map_err(|source| SettingsError::Write {
            path: path.clone(),
            source,
        })?;

    tracing::debug!(path = %path.display(), grants = policy.grants().len(), "Wrote security settings");
    Ok(path)
}

/// Read a settings file back.
pub fn load(path: &Path) -> Result<SecuritySettings, SettingsError> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = temp_path(path);
    let result = write_and_sync(&temp_path, content).and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_sync(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::{CommandAllowlist, CommandValidator};
    use std::sync::Arc;

    fn policy() -> SecurityPolicy {
        let hook: Arc<dyn CommandValidator> = Arc::new(CommandAllowlist::new(["ls"]));
        SecurityPolicy::build(hook, ["mcp__playwright__browser_close"], "mcp__gateway__*")
    }

    #[test]
    fn test_persist_writes_wire_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = persist(dir.path(), &policy()).unwrap();

        assert_eq!(path, dir.path().join(SETTINGS_FILE_NAME));
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["sandbox"]["enabled"], true);
        assert_eq!(raw["sandbox"]["autoAllowBashIfSandboxed"], true);
        assert_eq!(raw["permissions"]["defaultMode"], "acceptEdits");
        assert_eq!(raw["permissions"]["allow"][5], "Bash(*)");
    }

    #[test]
    fn test_persist_creates_missing_session_dir() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("nested").join("session");
        let path = persist(&session, &policy()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_persist_overwrites_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        persist(dir.path(), &policy()).unwrap();
        persist(dir.path(), &policy()).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![SETTINGS_FILE_NAME.to_string()]);
    }

    #[test]
    fn test_persist_failure_is_reported_with_remediation() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();
        let session = blocker.join("session");

        let err = persist(&session, &policy()).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, SettingsError::Write { .. }));
        assert!(message.contains("Check disk space and file permissions."));
        assert!(message.contains("Agent cannot start without security settings."));
        assert!(!session.join(SETTINGS_FILE_NAME).exists());
    }

    #[test]
    fn test_load_round_trips_policy_view() {
        let dir = tempfile::tempdir().unwrap();
        let policy = policy();
        let path = persist(dir.path(), &policy).unwrap();
        assert_eq!(load(&path).unwrap(), policy.to_settings());
    }

    #[test]
    fn test_load_reports_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load(&path), Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_persisted_file_matches_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = persist(dir.path(), &policy()).unwrap();
        let instance: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        let validator = jsonschema::validator_for(&SecuritySettings::schema()).unwrap();
        assert!(validator.is_valid(&instance));
        assert!(!validator.is_valid(&serde_json::json!({
            "sandbox": {"enabled": "yes"},
            "permissions": {"defaultMode": "acceptEdits", "allow": []}
        })));
    }
}
