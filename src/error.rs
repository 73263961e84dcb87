//! Error types for Convo Bridge.

/// Top-level error type for the bridge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Durable key-value storage errors.
///
/// These never escape the conversation store: `load`/`save`/`clear` contain
/// them and surface a diagnostic instead.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Read failed for key {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Write rejected for key {key}: {source}")]
    WriteRejected {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Remove failed for key {key}: {source}")]
    Remove {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored record under key {key} is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Bridge server errors.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Result type alias for the bridge.
pub type Result<T> = std::result::Result<T, Error>;
