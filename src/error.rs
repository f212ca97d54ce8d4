//! Error types for configuration, assets and frame sinks.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Rejected configuration, surfaced before any simulation begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The arena needs at least two contenders
    #[error("Need at least 2 flags, found {found}")]
    NotEnoughAssets { found: usize },

    #[error("Invalid config value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Streaming requires a destination supplied from outside the binary
    #[error("No stream URL configured (pass --stream-url or set FLAG_ROYALE_STREAM_URL)")]
    MissingStreamUrl,
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Flag sprite loading failures.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Failed to read asset directory {path}: {source}")]
    Dir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Frame sink failures. All of them end the current session.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The consumer went away (process exited, pipe or channel closed)
    #[error("Sink unavailable: {0}")]
    Unavailable(String),

    /// External encoder finished with a failing status
    #[error("Encoder stage `{stage}` failed with {status}")]
    Encoder {
        stage: &'static str,
        status: ExitStatus,
    },

    #[error("Failed to write frame {index}: {source}")]
    Frame {
        index: u64,
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// True when the downstream consumer is gone rather than misconfigured.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SinkError::Unavailable(_))
    }
}

/// Top-level error for a run.
#[derive(Debug, Error)]
pub enum RoyaleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

pub type Result<T> = std::result::Result<T, RoyaleError>;
