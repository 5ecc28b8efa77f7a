//! Server configuration.

use serde::{Deserialize, Serialize};

use subgen_core::DEFAULT_CHUNK_SIZE;

/// Configuration for the subtitle server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `8000`, `0` for auto-assign).
    pub port: u16,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    /// Maximum estimated audio duration in seconds.
    pub max_duration_secs: u64,
    /// Segments per translation call.
    pub chunk_size: usize,
    /// How long finished job records stay pollable before eviction.
    pub retention_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            max_upload_bytes: 50 * 1024 * 1024, // 50 MB
            max_duration_secs: 30 * 60,         // 30 minutes
            chunk_size: DEFAULT_CHUNK_SIZE,
            retention_secs: 3600,
        }
    }
}
