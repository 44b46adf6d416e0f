//! Version-control automation.
//!
//! The four primitives the pipeline needs are modelled by [`VersionControl`].
//! [`GitSession`] implements them by running `git` in the working tree and
//! keeps the session state (current branch, staged paths) as plain fields.
//! Every primitive blocks until the command exits. None of them retries.

use crate::constants::DEFAULT_REMOTE;
use crate::error::{Error, Result};
use log::{debug, error};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub command: String,
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Branch, stage, commit and push.
///
/// A non-zero exit is returned as `Error::CommandError`; whether that stops
/// anything is up to the caller.
pub trait VersionControl {
    /// Creates `name` and switches to it.
    fn create_branch(&mut self, name: &str) -> Result<CommandOutput>;

    /// Stages a file or directory.
    fn stage_path(&mut self, path: &Path) -> Result<CommandOutput>;

    /// Commits staged changes, or only `scope` when given.
    fn commit(&mut self, message: &str, scope: Option<&Path>) -> Result<CommandOutput>;

    /// Pushes `name` to the remote and sets the upstream.
    fn push_branch(&mut self, name: &str) -> Result<CommandOutput>;

    /// Directory that relative paths given to the primitives are resolved against.
    fn workdir(&self) -> &Path;
}

/// A git working tree driven through the `git` executable.
#[derive(Debug, Clone)]
pub struct GitSession {
    workdir: PathBuf,
    remote: String,
    current_branch: Option<String>,
    staged: Vec<PathBuf>,
}

impl GitSession {
    /// Opens the repository containing `path`.
    ///
    /// # Errors
    /// * `Error::Git2Error` if no repository is found
    /// * `Error::ConfigError` for a bare repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = git2::Repository::discover(path.as_ref())?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| {
                Error::ConfigError(format!(
                    "repository at '{}' has no working tree",
                    repo.path().display()
                ))
            })?
            .to_path_buf();
        let current_branch = match repo.head() {
            Ok(head) if head.is_branch() => head.shorthand().map(str::to_string),
            _ => None,
        };
        debug!(
            "Opened repository at {} on branch {:?}",
            workdir.display(),
            current_branch
        );
        Ok(Self::new(workdir, current_branch))
    }

    /// Session over `workdir` without touching the repository.
    pub fn new<P: Into<PathBuf>>(workdir: P, current_branch: Option<String>) -> Self {
        Self {
            workdir: workdir.into(),
            remote: DEFAULT_REMOTE.to_string(),
            current_branch,
            staged: Vec::new(),
        }
    }

    pub fn with_remote<S: Into<String>>(mut self, remote: S) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Branch checked out, `None` when unborn or detached at open time.
    pub fn current_branch(&self) -> Option<&str> {
        self.current_branch.as_deref()
    }

    /// Paths staged through this session and not yet committed.
    pub fn staged(&self) -> &[PathBuf] {
        &self.staged
    }

    fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        let command = format!("git {}", args.join(" "));
        debug!("Running '{}' in {}", command, self.workdir.display());

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(Error::IoError)?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        // Killed by a signal leaves no code.
        let status = output.status.code().unwrap_or(-1);

        if !output.status.success() {
            error!("{}", stderr.trim_end());
            return Err(Error::CommandError { command, status, stderr });
        }
        if !stdout.trim().is_empty() {
            println!("{}", stdout.trim_end());
        }
        Ok(CommandOutput { command, status, stdout, stderr })
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl VersionControl for GitSession {
    fn create_branch(&mut self, name: &str) -> Result<CommandOutput> {
        let output = self.git(&["checkout", "-b", name])?;
        self.current_branch = Some(name.to_string());
        Ok(output)
    }

    fn stage_path(&mut self, path: &Path) -> Result<CommandOutput> {
        let output = self.git(&["add", "--", &path_arg(path)])?;
        self.staged.push(path.to_path_buf());
        Ok(output)
    }

    fn commit(&mut self, message: &str, scope: Option<&Path>) -> Result<CommandOutput> {
        let output = match scope {
            Some(path) => {
                let output = self.git(&["commit", "-m", message, "--", &path_arg(path)])?;
                self.staged.retain(|staged| !staged.starts_with(path));
                output
            }
            None => {
                let output = self.git(&["commit", "-m", message])?;
                self.staged.clear();
                output
            }
        };
        Ok(output)
    }

    fn push_branch(&mut self, name: &str) -> Result<CommandOutput> {
        let remote = self.remote.clone();
        self.git(&["push", "-u", &remote, name])
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_finds_workdir_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        git2::Repository::init(temp.path()).unwrap();
        let nested = temp.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();

        let session = GitSession::open(&nested).unwrap();
        assert_eq!(
            session.workdir().canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
        // Nothing committed yet, HEAD is unborn.
        assert_eq!(session.current_branch(), None);
        assert!(session.staged().is_empty());
        assert_eq!(session.remote(), "origin");
    }

    #[test]
    fn open_reads_current_branch() {
        let temp = TempDir::new().unwrap();
        let repo = git2::Repository::init(temp.path()).unwrap();
        let signature = git2::Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let commit = repo.commit(None, &signature, &signature, "init", &tree, &[]).unwrap();
        let commit = repo.find_commit(commit).unwrap();
        repo.branch("develop", &commit, false).unwrap();
        repo.set_head("refs/heads/develop").unwrap();

        let session = GitSession::open(temp.path()).unwrap();
        assert_eq!(session.current_branch(), Some("develop"));
    }

    #[test]
    fn open_outside_repository_fails() {
        let temp = TempDir::new().unwrap();
        // A fresh temp dir may still sit inside a repository on some machines.
        if git2::Repository::discover(temp.path()).is_ok() {
            return;
        }
        assert!(matches!(GitSession::open(temp.path()), Err(Error::Git2Error(_))));
    }

    #[test]
    fn with_remote_overrides_origin() {
        let session = GitSession::new("/tmp", None).with_remote("upstream");
        assert_eq!(session.remote(), "upstream");
    }
}
