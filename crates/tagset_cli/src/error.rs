//! CLI error types.

use std::path::PathBuf;

use tagset_codec::CodecError;
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A command that needs `--path` was run without it.
    #[error("record file path required for {0}")]
    MissingPath(&'static str),

    /// Reading or writing the record file failed.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file does not hold valid records.
    #[error("record at offset {offset}: {source}")]
    Codec {
        /// Byte offset of the failing record.
        offset: usize,
        /// Underlying error.
        #[source]
        source: CodecError,
    },

    /// Building a record failed.
    #[error(transparent)]
    Build(#[from] CodecError),

    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Verification found problems.
    #[error("verification failed with {problems} problem(s)")]
    VerificationFailed {
        /// Number of problems found.
        problems: usize,
    },
}

impl CliError {
    /// Wraps an I/O error with the file it concerns.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
