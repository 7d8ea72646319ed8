//! Prompt provisioning for sub-agents.
//!
//! Sub-agents receive a short stub prompt pointing at their full
//! instructions, which are copied into `<session>/.prompts/`. Keeping the
//! full text out of the agent definitions keeps the runtime's launch command
//! small.

use crate::error::OrcaError;
use std::fs::{self, File, FileTimes};
use std::path::{Component, Path, PathBuf};

/// Directory under the session directory holding agent prompts.
pub const PROMPTS_DIR_NAME: &str = ".prompts";

/// System prompt file for the orchestrator.
pub const ORCHESTRATOR_PROMPT_FILE: &str = "orchestrator_prompt.md";

/// Full-instruction file for each sub-agent.
pub const AGENT_PROMPT_FILES: &[(&str, &str)] = &[
    ("linear", "linear_agent_prompt.md"),
    ("coding", "coding_agent_prompt.md"),
    ("github", "github_agent_prompt.md"),
    ("slack", "slack_agent_prompt.md"),
];

/// Prompt file registered for `agent`.
pub fn prompt_file(agent: &str) -> Option<&'static str> {
    AGENT_PROMPT_FILES
        .iter()
        .find(|(name, _)| *name == agent)
        .map(|(_, file)| *file)
}

/// Build the stub prompt for `agent`.
///
/// With a session directory the stub names the absolute path of the prompt
/// file, since a sub-agent may not share the orchestrator's working
/// directory. Without one it names `.prompts/<file>`.
pub fn stub_prompt(agent: &str, session_dir: Option<&Path>) -> Result<String, OrcaError> {
    let file = prompt_file(agent).ok_or_else(|| OrcaError::UnknownAgent(agent.to_string()))?;
    let location = match session_dir {
        Some(dir) => absolute_dir(dir)?
            .join(PROMPTS_DIR_NAME)
            .join(file)
            .display()
            .to_string(),
        None => format!("{PROMPTS_DIR_NAME}/{file}"),
    };
    Ok(format!(
        "IMPORTANT: Your full instructions are in `{location}`. \
         You MUST read that file with the Read tool BEFORE doing anything else. \
         Follow those instructions exactly."
    ))
}

/// Resolve `dir` to an absolute path, following symlinks when it exists.
///
/// A directory that does not exist yet is resolved lexically, so the result
/// never contains `.` or `..` components.
pub(crate) fn absolute_dir(dir: &Path) -> Result<PathBuf, OrcaError> {
    let session_dir_error = |source| OrcaError::SessionDir {
        path: dir.to_path_buf(),
        source,
    };
    match dir.canonicalize() {
        Ok(path) => Ok(path),
        Err(_) if dir.is_absolute() => Ok(normalize_lexically(dir)),
        Err(_) => std::env::current_dir()
            .map(|cwd| normalize_lexically(&cwd.join(dir)))
            .map_err(session_dir_error),
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Copies prompt files from a source directory into session directories.
#[derive(Debug, Clone)]
pub struct PromptProvisioner {
    source_dir: PathBuf,
}

impl PromptProvisioner {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Copy every agent prompt into `<session_dir>/.prompts/`.
    ///
    /// Safe to call repeatedly: the directory is reused and files are
    /// overwritten in place. Permissions and timestamps follow the source.
    pub fn provision(&self, session_dir: &Path) -> Result<PathBuf, OrcaError> {
        let dest = session_dir.join(PROMPTS_DIR_NAME);
        fs::create_dir_all(&dest).map_err(|source| OrcaError::Prompt {
            path: dest.clone(),
            source,
        })?;

        for (agent, file) in AGENT_PROMPT_FILES {
            let src = self.source_dir.join(file);
            let dst = dest.join(file);
            copy_preserving(&src, &dst).map_err(|source| OrcaError::Prompt {
                path: src.clone(),
                source,
            })?;
            tracing::debug!(agent, path = %dst.display(), "Provisioned agent prompt");
        }

        Ok(dest)
    }

    /// Read the orchestrator's system prompt.
    pub fn load_orchestrator_prompt(&self) -> Result<String, OrcaError> {
        let path = self.source_dir.join(ORCHESTRATOR_PROMPT_FILE);
        fs::read_to_string(&path).map_err(|source| OrcaError::Prompt { path, source })
    }
}

fn copy_preserving(src: &Path, dst: &Path) -> std::io::Result<()> {
    if let Ok(existing) = fs::metadata(dst) {
        let mut permissions = existing.permissions();
        if permissions.readonly() {
            permissions.set_readonly(false);
            fs::set_permissions(dst, permissions)?;
        }
    }

    fs::copy(src, dst)?;
    let metadata = fs::metadata(src)?;
    let times = FileTimes::new()
        .set_accessed(metadata.accessed()?)
        .set_modified(metadata.modified()?);
    File::options().write(true).open(dst)?.set_times(times)
}
