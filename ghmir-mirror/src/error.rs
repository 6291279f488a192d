//! Error types for ghmir-mirror.

use std::path::PathBuf;

use thiserror::Error;

use ghmir_core::ConfigError;

/// Errors that stop a run or a whole entity batch. Per-repository failures
/// are never surfaced through this type; they become
/// [`Outcome::Failure`](crate::executor::Outcome::Failure).
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Configuration or validation failure, fatal to the run.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A spawn failure for an external program (not found, not executable).
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("backup root path is empty")]
    EmptyBackupRoot,

    #[error("backup directory {path} not found")]
    BackupDirNotFound { path: PathBuf },

    #[error("cannot build destination URL: {0}")]
    RemoteUrl(String),

    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

/// Notification delivery failure. Logged by callers, never escalated.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook returned status {0}")]
    Status(u16),

    #[error("webhook transport error: {0}")]
    Transport(String),
}

/// Convenience constructor for [`MirrorError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MirrorError {
    MirrorError::Io {
        path: path.into(),
        source,
    }
}
