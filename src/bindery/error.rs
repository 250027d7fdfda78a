use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors surfaced by notebook operations.
///
/// Low-level I/O and parse failures are wrapped with a human-readable
/// message plus the original cause. Structural rule violations
/// ([`BinderyError::IllegalOperation`]) are rejected before any filesystem
/// mutation takes place.
#[derive(Error, Debug)]
pub enum BinderyError {
    #[error("{0}")]
    Io(String, #[source] io::Error),

    #[error("corrupt metadata in '{}': {}", .0.display(), .1)]
    Corrupt(PathBuf, String),

    #[error("notebook version {found} is newer than what is readable ({supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("{0}")]
    IllegalOperation(String),
}

impl BinderyError {
    pub(crate) fn io(msg: impl Into<String>, source: io::Error) -> Self {
        BinderyError::Io(msg.into(), source)
    }

    pub(crate) fn corrupt(path: &Path, detail: impl Into<String>) -> Self {
        BinderyError::Corrupt(path.to_path_buf(), detail.into())
    }

    pub(crate) fn illegal(msg: impl Into<String>) -> Self {
        BinderyError::IllegalOperation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, BinderyError>;
