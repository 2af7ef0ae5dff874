use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::GitCommandError;
use crate::resolver::ChangeSource;

/// [`ChangeSource`] backed by the `git` executable
#[derive(Debug, Clone)]
pub struct Git {
    repo_path: PathBuf,
}

impl Git {
    /// Create a source for the repository at `repo_path`
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Top-level directory of the working tree containing `repo_path`
    pub async fn toplevel(&self) -> Result<PathBuf, GitCommandError> {
        let output = self.run(&["rev-parse", "--show-toplevel"]).await?;
        Ok(PathBuf::from(output.trim_end()))
    }

    /// Run a git subcommand in the repository and return its stdout
    async fn run(&self, args: &[&str]) -> Result<String, GitCommandError> {
        let command = args.first().copied().unwrap_or_default().to_string();

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(args)
            .output()
            .await
            .map_err(|e| GitCommandError::SpawnFailed {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitCommandError::ExitError {
                command,
                stderr: stderr.trim_end().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| GitCommandError::InvalidUtf8 {
            command,
            message: e.to_string(),
        })
    }
}

impl ChangeSource for Git {
    async fn status(&self) -> Result<String, GitCommandError> {
        self.run(&["status", "--porcelain"]).await
    }

    async fn diff(
        &self,
        file_path: &str,
        staged: bool,
        context_lines: u32,
    ) -> Result<String, GitCommandError> {
        // Status paths are relative to the top level, not to `repo_path`
        let pathspec = format!(":(top){file_path}");
        let unified = format!("-U{context_lines}");
        let mut args = vec!["diff", "--no-ext-diff", unified.as_str(), "--no-color"];
        if staged {
            args.push("--cached");
        }
        args.extend(["--", pathspec.as_str()]);

        self.run(&args).await
    }
}
