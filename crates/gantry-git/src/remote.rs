//! Remote operations
//!
//! Pushes shell out to the `git` CLI so the user's configured
//! credential helpers apply.

use std::path::Path;
use std::process::Command;

use tracing::{info, instrument};

use crate::repository::{GitRepo, Result};
use gantry_core::error::GitError;

impl GitRepo {
    /// Add a remote by name
    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.repo.remote(name, url)?;
        info!(remote = name, url, "added remote");
        Ok(())
    }

    /// Check if a remote exists
    pub fn has_remote(&self, name: &str) -> Result<bool> {
        let remotes = self.repo.remotes()?;
        Ok(remotes.iter().flatten().any(|r| r == name))
    }
}

/// Push the current branch to a remote
#[instrument(fields(dir = %dir.display(), remote))]
pub fn git_push(dir: &Path, remote: &str) -> Result<()> {
    run_git(dir, &["push", remote])
}

/// Push the current branch with upstream tracking set
#[instrument(fields(dir = %dir.display(), remote))]
pub fn git_push_upstream(dir: &Path, remote: &str) -> Result<()> {
    run_git(dir, &["push", "-u", remote, "HEAD"])
}

fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
    let start = std::time::Instant::now();
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| GitError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            reason: e.to_string(),
        })?;

    info!(
        command = %format!("git {}", args.join(" ")),
        duration_ms = start.elapsed().as_millis(),
        success = output.status.success(),
        "git command finished"
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::PushFailed(stderr.trim().to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_and_find_remote() {
        let temp = TempDir::new().unwrap();
        let repo = GitRepo::init(temp.path()).unwrap();

        assert!(!repo.has_remote("origin").unwrap());
        repo.add_remote("origin", "https://github.com/acme/widget.git")
            .unwrap();
        assert!(repo.has_remote("origin").unwrap());
    }

    #[test]
    fn test_push_without_remote_fails() {
        let temp = TempDir::new().unwrap();
        GitRepo::init(temp.path()).unwrap();

        let result = git_push(temp.path(), "origin");
        assert!(result.is_err());
    }
}
