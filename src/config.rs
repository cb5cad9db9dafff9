use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrawlerError};

/// Ports below this are privileged and refused outright.
pub const MIN_PORT: u16 = 1024;

/// Worker threads serving HTTP requests unless configured otherwise.
pub const DEFAULT_WORKER_THREADS: usize = 8;

/// Configuration for the HTTP search server
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    pub index_paths: Vec<PathBuf>,
    pub worker_threads: usize,
}

impl ServerConfig {
    pub fn new(port: u16, static_dir: PathBuf, index_paths: Vec<PathBuf>) -> Self {
        Self {
            port,
            static_dir,
            index_paths,
            worker_threads: DEFAULT_WORKER_THREADS,
        }
    }

    /// Set the number of worker threads
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Check every argument the server cannot run without: an
    /// unprivileged port, a readable static-file directory, and at least
    /// one readable regular index file.
    pub fn validate(&self) -> Result<()> {
        if self.port < MIN_PORT {
            return Err(TrawlerError::InvalidArgument(format!(
                "port must be in {}..=65535, got {}",
                MIN_PORT, self.port
            )));
        }

        let dir_meta = fs::metadata(&self.static_dir)
            .map_err(|_| TrawlerError::NotADirectory(self.static_dir.clone()))?;
        if !dir_meta.is_dir() || fs::read_dir(&self.static_dir).is_err() {
            return Err(TrawlerError::NotADirectory(self.static_dir.clone()));
        }

        if self.index_paths.is_empty() {
            return Err(TrawlerError::InvalidArgument(
                "at least one index file is required".to_string(),
            ));
        }
        for path in &self.index_paths {
            let readable = fs::metadata(path)
                .map(|meta| meta.is_file())
                .unwrap_or(false)
                && fs::File::open(path).is_ok();
            if !readable {
                return Err(TrawlerError::InvalidArgument(format!(
                    "index {} is not a readable file",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}
