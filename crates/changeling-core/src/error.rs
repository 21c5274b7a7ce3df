//! Error types for changeling-core

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Failed to read the project manifest.
    #[error("failed to read {path}: {source}")]
    ReadManifest {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The project manifest is not valid JSON or has an unexpected shape.
    #[error("failed to parse {path}: {source}")]
    ParseManifest {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// No GitHub repository could be determined.
    #[error(
        "could not infer \"repo\" from package.json; set `repo = \"owner/name\"` in the configuration"
    )]
    MissingRepo,

    /// `next_version_from_metadata` is set but the manifest has no version.
    #[error("could not infer \"next_version\" from package.json")]
    MissingNextVersion,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;
