//! Version-control collaborator.
//!
//! Runs the `git` binary with the store root as working directory. A store
//! is git-managed when `<store>/.git` exists.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::{debug, warn};

use crate::error::{GitError, Result};

/// `git`, run inside one directory.
#[derive(Debug, Clone)]
pub struct Git {
    program: String,
    dir: PathBuf,
}

impl Git {
    pub fn new(program: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            dir: dir.into(),
        }
    }

    /// Whether the directory is a git work tree root.
    pub fn is_managed(&self) -> bool {
        self.dir.join(".git").exists()
    }

    /// Stage `paths` and commit them with `message`.
    ///
    /// Output is captured; git's own messages are only logged.
    ///
    /// # Errors
    ///
    /// Returns `GitError` if git cannot be spawned or exits non-zero.
    pub fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()> {
        let relative: Vec<&Path> = paths
            .iter()
            .map(|p| p.strip_prefix(&self.dir).unwrap_or(p.as_path()))
            .collect();
        debug!(paths = ?relative, commit_message = message, "committing");

        let mut add = self.command();
        add.args(["add", "--all", "--"]).args(&relative);
        self.captured("add", add)?;

        let mut commit = self.command();
        commit.args(["commit", "-m", message, "--"]).args(&relative);
        self.captured("commit", commit)?;

        Ok(())
    }

    /// Commit, logging a warning instead of failing.
    ///
    /// Returns whether the commit succeeded.
    pub fn commit_best_effort(&self, paths: &[PathBuf], message: &str) -> bool {
        match self.commit(paths, message) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "git commit failed; change left uncommitted");
                false
            }
        }
    }

    /// Run git with `args`, inheriting the terminal.
    ///
    /// # Errors
    ///
    /// Returns `GitError::Failed` if git exits non-zero.
    pub fn run(&self, args: &[String]) -> Result<()> {
        debug!(args = ?args, dir = %self.dir.display(), "running git");
        let mut cmd = self.command();
        cmd.args(args);
        let status = cmd.status().map_err(GitError::Spawn)?;
        check(args.first().map(String::as_str).unwrap_or(""), status)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.dir);
        cmd
    }

    fn captured(&self, subcommand: &str, mut cmd: Command) -> Result<()> {
        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(GitError::Spawn)?;
        if !output.status.success() {
            debug!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                stdout = %String::from_utf8_lossy(&output.stdout).trim(),
                "git {} failed",
                subcommand
            );
        }
        check(subcommand, output.status)
    }
}

fn check(command: &str, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(GitError::Failed {
            command: command.to_string(),
            code: status.code().unwrap_or(-1),
        }
        .into())
    }
}
