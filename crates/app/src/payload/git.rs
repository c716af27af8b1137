//! Git as a payload source and sink, by shelling out to the `git` binary.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{PayloadError, PayloadSink, PayloadSource};

/// File the receiving side leaves a patch in when git refuses it
const REJECTED_PATCH: &str = "git-share-rejected.patch";

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] io::Error),
    #[error("git {command} failed: {message}")]
    Failed { command: String, message: String },
    #[error("not a git repository (or any parent): {0}")]
    NotARepository(String),
    #[error("{0}")]
    NoChanges(&'static str),
    #[error("invalid commit reference {0:?} (not found or not a commit)")]
    InvalidRevision(String),
    #[error("no commits found for {0:?}")]
    NoCommits(String),
}

/// `git` run from a fixed working directory
#[derive(Debug, Clone)]
pub struct Git {
    dir: PathBuf,
}

impl Git {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.dir);
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>, GitError> {
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(GitError::Spawn)?;
        check_status(args, output)
    }

    fn run_with_input(&self, args: &[&str], input: &[u8]) -> Result<Vec<u8>, GitError> {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(GitError::Spawn)?;

        // feed stdin from another thread so a chatty git cannot fill its pipes and stall
        let output = std::thread::scope(|scope| {
            let stdin = child.stdin.take();
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(input),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            // git may exit before reading everything; its status says what went wrong
            let _ = writer.join();
            output
        })
        .map_err(GitError::Spawn)?;
        check_status(args, output)
    }

    /// Top level of the working tree
    pub fn repo_root(&self) -> Result<PathBuf, GitError> {
        match self.run(&["rev-parse", "--show-toplevel"]) {
            Ok(out) => Ok(PathBuf::from(String::from_utf8_lossy(&out).trim())),
            Err(GitError::Failed { message, .. }) => Err(GitError::NotARepository(message)),
            Err(e) => Err(e),
        }
    }

    fn git_dir(&self) -> Result<PathBuf, GitError> {
        let out = self.run(&["rev-parse", "--absolute-git-dir"])?;
        Ok(PathBuf::from(String::from_utf8_lossy(&out).trim()))
    }

    fn has_changes(&self, args: &[&str]) -> bool {
        self.run(args).map(|out| !out.is_empty()).unwrap_or(false)
    }

    /// Uncommitted, unstaged changes in the working tree
    pub fn diff(&self) -> Result<Vec<u8>, GitError> {
        let out = self.run(&["diff", "--binary"])?;
        if !out.is_empty() {
            return Ok(out);
        }
        if self.has_changes(&["diff", "--cached", "--name-only"]) {
            return Err(GitError::NoChanges(
                "no uncommitted changes found (only staged changes, try --staged)",
            ));
        }
        Err(GitError::NoChanges("no uncommitted changes found"))
    }

    /// Changes in the index
    pub fn staged_diff(&self) -> Result<Vec<u8>, GitError> {
        let out = self.run(&["diff", "--cached", "--binary"])?;
        if !out.is_empty() {
            return Ok(out);
        }
        if self.has_changes(&["diff", "--name-only"]) {
            return Err(GitError::NoChanges(
                "no staged changes found (only unstaged changes, drop --staged)",
            ));
        }
        Err(GitError::NoChanges("no staged changes found"))
    }

    /// `format-patch` output for one commit, or for every commit in a `a..b` range
    pub fn commit_patch(&self, revision: &str) -> Result<Vec<u8>, GitError> {
        let out = if revision.contains("..") {
            self.run(&["format-patch", "--stdout", revision])?
        } else {
            let object = format!("{revision}^{{commit}}");
            if self.run(&["rev-parse", "--verify", "--quiet", &object]).is_err() {
                return Err(GitError::InvalidRevision(revision.to_string()));
            }
            self.run(&["format-patch", "--stdout", "-1", revision])?
        };
        if out.is_empty() {
            return Err(GitError::NoCommits(revision.to_string()));
        }
        Ok(out)
    }

    /// Apply a patch to the working tree, or commit it with `git am`
    pub fn apply(&self, patch: &[u8], commit: bool) -> Result<(), GitError> {
        if !commit {
            return self.run_with_input(&["apply"], patch).map(drop);
        }
        if let Err(e) = self.run_with_input(&["am"], patch) {
            // leave the repository as it was
            let _ = self.run(&["am", "--abort"]);
            return Err(e);
        }
        Ok(())
    }

    /// `git apply --stat` summary, if git can read the patch
    pub fn stats(&self, patch: &[u8]) -> Option<String> {
        let out = self.run_with_input(&["apply", "--stat"], patch).ok()?;
        let stats = String::from_utf8_lossy(&out).trim_end().to_string();
        (!stats.is_empty()).then_some(stats)
    }
}

fn check_status(args: &[&str], output: std::process::Output) -> Result<Vec<u8>, GitError> {
    if output.status.success() {
        return Ok(output.stdout);
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(GitError::Failed {
        command: args.first().copied().unwrap_or_default().to_string(),
        message: if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr
        },
    })
}

/// Which changes a [`GitSource`] collects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitSelection {
    WorkingTree,
    Staged,
    /// A commit or a `a..b` range, sent as `format-patch` output
    Revision(String),
}

pub struct GitSource {
    git: Git,
    selection: GitSelection,
}

impl GitSource {
    pub fn new(git: Git, selection: GitSelection) -> Self {
        Self { git, selection }
    }
}

impl PayloadSource for GitSource {
    fn read_payload(&mut self) -> Result<Vec<u8>, PayloadError> {
        self.git.repo_root()?;
        let patch = match &self.selection {
            GitSelection::WorkingTree => self.git.diff()?,
            GitSelection::Staged => self.git.staged_diff()?,
            GitSelection::Revision(revision) => self.git.commit_patch(revision)?,
        };
        tracing::debug!(bytes = patch.len(), "collected changes");
        Ok(patch)
    }
}

/// Applies a received patch to a repository
pub struct GitSink {
    git: Git,
    commit: bool,
    root: Option<PathBuf>,
}

impl GitSink {
    pub fn new(git: Git, commit: bool) -> Self {
        Self {
            git,
            commit,
            root: None,
        }
    }

    /// Keep a refused patch in the git directory so it is not lost with the relay copy
    fn save_rejected(&self, data: &[u8]) -> Option<PathBuf> {
        let path = self.git.git_dir().ok()?.join(REJECTED_PATCH);
        std::fs::write(&path, data).ok()?;
        Some(path)
    }
}

impl PayloadSink for GitSink {
    fn prepare(&mut self) -> Result<(), PayloadError> {
        self.root = Some(self.git.repo_root()?);
        Ok(())
    }

    fn apply(&mut self, data: &[u8]) -> Result<(), PayloadError> {
        match self.git.apply(data, self.commit) {
            Ok(()) => Ok(()),
            Err(source) => match self.save_rejected(data) {
                Some(saved) => Err(PayloadError::Rejected { source, saved }),
                None => Err(source.into()),
            },
        }
    }

    fn describe(&self) -> String {
        self.root
            .as_deref()
            .unwrap_or(self.git.dir())
            .display()
            .to_string()
    }

    fn summary(&self, data: &[u8]) -> String {
        let action = if self.commit { "Committed" } else { "Applied" };
        let mut summary = format!("{action} patch in {}", self.describe());
        if let Some(stats) = self.git.stats(data) {
            summary.push_str("\n\n");
            summary.push_str(&stats);
        }
        summary
    }
}
