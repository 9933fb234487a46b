//! Core error types for cardbox-core.
//!
//! Store and configuration failures get their own enums; `CoreError` is the
//! umbrella the library surfaces at its boundary. Malformed deck records are
//! deliberately not an error anywhere in this hierarchy -- loading skips
//! them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cardbox-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Deck store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Deck-store-specific errors. All of these are fatal to a run.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The deck file could not be opened or created
    #[error("Failed to open deck at {}: {}", .path.display(), .source)]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the deck file failed mid-stream
    #[error("Failed to read deck at {}: {}", .path.display(), .source)]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Writing the deck file failed
    #[error("Failed to write deck at {}: {}", .path.display(), .source)]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A card with this prompt already exists in the deck
    #[error("A card with prompt '{0}' already exists")]
    DuplicatePrompt(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {}: {}", .path.display(), .message)]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {}: {}", .path.display(), .message)]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not name a configuration field
    #[error("Unknown config key: {0}")]
    UnknownKey(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
