//! Error types for the progress tracking library.

use thiserror::Error;

/// Result type alias for the library.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Main error type for the progress tracking library.
///
/// Producer-facing tracker operations never return this type. It covers the
/// fallible edges around them: spawning the UI thread, loading configuration,
/// and the demo workloads driven by the CLI.
#[derive(Error, Debug)]
pub enum ProgressError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The UI-affinity thread could not be started or is no longer running.
    #[error("UI thread error: {0}")]
    UiThread(String),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
