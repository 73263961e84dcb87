//! Bridge configuration, read from the environment.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Runtime configuration for the bridge server.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Port the WebSocket/REST server listens on.
    pub port: u16,
    /// Directory holding the durable key-value store.
    pub data_dir: PathBuf,
    /// If set, only WebSocket upgrades with this exact `Origin` header are
    /// accepted. Unset means any origin (the permissive default).
    pub allowed_origin: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: 8090,
            data_dir: PathBuf::from("./data"),
            allowed_origin: None,
        }
    }
}

impl BridgeConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// - `CONVO_BRIDGE_PORT` — listen port
    /// - `CONVO_BRIDGE_DATA_DIR` — storage directory
    /// - `CONVO_BRIDGE_ALLOWED_ORIGIN` — exact origin to accept; `*` or unset
    ///   accepts any origin
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match std::env::var("CONVO_BRIDGE_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CONVO_BRIDGE_PORT".to_string(),
                message: format!("expected a port number, got {raw:?}"),
            })?,
            Err(_) => defaults.port,
        };

        let data_dir = std::env::var("CONVO_BRIDGE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let allowed_origin = std::env::var("CONVO_BRIDGE_ALLOWED_ORIGIN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && v != "*");

        Ok(Self {
            port,
            data_dir,
            allowed_origin,
        })
    }
}
