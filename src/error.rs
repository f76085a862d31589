//! Error types for audioenc

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Export error type
#[derive(Error, Debug)]
pub enum ExportError {
    /// The encoder process could not be started (missing executable,
    /// permission failure). Checked before any data transfer begins.
    #[error("failed to spawn encoder: {0}")]
    Spawn(#[source] io::Error),

    /// The encoder's input pipe rejected a write (closed pipe, crashed
    /// encoder). A short write surfaces here as `ErrorKind::WriteZero`.
    #[error("write to encoder pipe failed: {0}")]
    Write(#[source] io::Error),

    /// The caller requested abort via the poll callback. Clean teardown,
    /// not a fault.
    #[error("export cancelled")]
    Cancelled,

    /// Destination path cannot be handed to the encoder (not valid UTF-8).
    /// Fails the export before spawn.
    #[error("destination path is not representable: {0:?}")]
    InvalidPath(PathBuf),

    /// The encoder consumed all input but exited with a failure status.
    #[error("encoder exited with {0}")]
    EncoderFailed(ExitStatus),

    /// I/O error outside the encoder pipe (preset file operations,
    /// waiting on the child).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Preset file could not be parsed.
    #[error("preset store error: {0}")]
    Preset(String),
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Preset(e.to_string())
    }
}
