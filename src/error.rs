//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Why an image could not be loaded for display.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image loader worker is not running")]
    WorkerGone,

    #[error("failed to start image loader worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Failure listing a gallery directory.
#[derive(Debug, Error)]
#[error("failed to read directory {path}: {source}")]
pub struct ScanError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Problems reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}
