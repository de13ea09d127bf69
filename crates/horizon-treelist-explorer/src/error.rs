//! Error type of the explorer binary.

use std::io;
use std::path::PathBuf;

use horizon_treelist::TreeListError;
use thiserror::Error;

/// Result alias for explorer operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Failures while configuring, enumerating or rendering.
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// A directory could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML for [`ExplorerConfig`](crate::config::ExplorerConfig).
    #[error("invalid configuration in {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The control rejected an operation.
    #[error(transparent)]
    TreeList(#[from] TreeListError),

    /// No root was given and the home directory is unknown.
    #[error("no root directory given and no home directory found")]
    NoHomeDirectory,

    /// Bad command line.
    #[error("{0}\n\nusage: horizon-treelist-explorer [--config <file>] [--expand <depth>] [ROOT]")]
    Usage(String),
}

impl ExplorerError {
    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
