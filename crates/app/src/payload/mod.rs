//! Where payloads come from on the sending side and where they land on the receiving side.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;

pub mod git;

pub use git::{Git, GitError, GitSelection, GitSink, GitSource};

/// How a file sink treats an existing target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum WriteMode {
    /// Refuse to touch a target that already exists
    #[default]
    Create,
    /// Replace the target's contents
    Overwrite,
    /// Add to the end of the target
    Append,
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("failed to read {target}: {source}")]
    Read { target: String, source: io::Error },
    #[error("failed to write {target}: {source}")]
    Write { target: String, source: io::Error },
    #[error("{0} already exists (use --mode overwrite or --mode append)")]
    Exists(PathBuf),
    #[error("nothing to send: the payload is empty")]
    Empty,
    #[error(transparent)]
    Git(#[from] GitError),
    #[error("{source}\nthe received patch was saved to {}", .saved.display())]
    Rejected { source: GitError, saved: PathBuf },
}

pub trait PayloadSource {
    /// Produce the raw bytes to share
    fn read_payload(&mut self) -> Result<Vec<u8>, PayloadError>;
}

/// Receiving side of an exchange.
///
/// Fetching a payload destroys it on the relay, so [`PayloadSink::prepare`]
/// runs first and must refuse every target that [`PayloadSink::apply`] would.
pub trait PayloadSink: Send {
    /// Check that the target can take a payload
    fn prepare(&mut self) -> Result<(), PayloadError>;

    /// Apply received bytes to the target
    fn apply(&mut self, data: &[u8]) -> Result<(), PayloadError>;

    /// Human-readable name of the target
    fn describe(&self) -> String;

    /// What to tell the user once `data` has been applied
    fn summary(&self, data: &[u8]) -> String {
        format!("Received {} bytes into {}", data.len(), self.describe())
    }
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PayloadSource for FileSource {
    fn read_payload(&mut self) -> Result<Vec<u8>, PayloadError> {
        std::fs::read(&self.path).map_err(|source| PayloadError::Read {
            target: self.path.display().to_string(),
            source,
        })
    }
}

pub struct StdinSource;

impl PayloadSource for StdinSource {
    fn read_payload(&mut self) -> Result<Vec<u8>, PayloadError> {
        let mut buf = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .map_err(|source| PayloadError::Read {
                target: "stdin".into(),
                source,
            })?;
        Ok(buf)
    }
}

pub struct FileSink {
    path: PathBuf,
    mode: WriteMode,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, mode: WriteMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    fn write_err(&self, source: io::Error) -> PayloadError {
        PayloadError::Write {
            target: self.path.display().to_string(),
            source,
        }
    }

    fn parent(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl PayloadSink for FileSink {
    fn prepare(&mut self) -> Result<(), PayloadError> {
        let parent = std::fs::metadata(self.parent()).map_err(|e| self.write_err(e))?;
        if !parent.is_dir() {
            return Err(self.write_err(io::Error::other("parent is not a directory")));
        }
        if parent.permissions().readonly() {
            return Err(self.write_err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "parent directory is read-only",
            )));
        }

        match std::fs::metadata(&self.path) {
            Ok(_) if self.mode == WriteMode::Create => Err(PayloadError::Exists(self.path.clone())),
            Ok(existing) if existing.is_dir() => {
                Err(self.write_err(io::Error::other("target is a directory")))
            }
            Ok(existing) if existing.permissions().readonly() => Err(self.write_err(
                io::Error::new(io::ErrorKind::PermissionDenied, "target is read-only"),
            )),
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.write_err(e)),
        }
    }

    fn apply(&mut self, data: &[u8]) -> Result<(), PayloadError> {
        let mut options = OpenOptions::new();
        match self.mode {
            WriteMode::Create => options.write(true).create_new(true),
            WriteMode::Overwrite => options.write(true).create(true).truncate(true),
            WriteMode::Append => options.append(true).create(true),
        };

        let mut file: File = options.open(&self.path).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                PayloadError::Exists(self.path.clone())
            } else {
                self.write_err(e)
            }
        })?;
        file.write_all(data).map_err(|e| self.write_err(e))?;
        file.flush().map_err(|e| self.write_err(e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes to stdout
pub struct StdoutSink;

impl PayloadSink for StdoutSink {
    fn prepare(&mut self) -> Result<(), PayloadError> {
        Ok(())
    }

    fn apply(&mut self, data: &[u8]) -> Result<(), PayloadError> {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(data)
            .and_then(|_| stdout.flush())
            .map_err(|source| PayloadError::Write {
                target: "stdout".into(),
                source,
            })
    }

    fn describe(&self) -> String {
        "stdout".into()
    }

    // the payload itself is the output
    fn summary(&self, _data: &[u8]) -> String {
        String::new()
    }
}
