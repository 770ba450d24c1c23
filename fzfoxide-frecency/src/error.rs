use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the history store and the ranker
#[derive(Error, Debug)]
pub enum FrecencyError {
    #[error("could not determine the home directory")]
    HomeDirUnavailable,

    #[error("{operation} failed on {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed history in {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: nix::Error,
    },

    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("no directory matching '{query}'")]
    NotFound { query: String },
}

impl FrecencyError {
    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        FrecencyError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Resolution ran fine but nothing qualified
    pub fn is_not_found(&self) -> bool {
        matches!(self, FrecencyError::NotFound { .. })
    }
}

pub type FrecencyResult<T> = std::result::Result<T, FrecencyError>;
