use std::path::PathBuf;

use thiserror::Error;

/// Main error type for trawler operations
#[derive(Error, Debug)]
pub enum TrawlerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt index file {}: {detail}", path.display())]
    CorruptIndex { path: PathBuf, detail: String },

    #[error("not a readable directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("index table grew past the format's 2 GiB offset limit ({0} bytes)")]
    IndexTooLarge(u64),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for trawler operations
pub type Result<T> = std::result::Result<T, TrawlerError>;

impl TrawlerError {
    /// Check whether this error means an index file failed its integrity
    /// checks, as opposed to an environmental failure.
    pub fn is_corruption(&self) -> bool {
        matches!(self, TrawlerError::CorruptIndex { .. })
    }
}
