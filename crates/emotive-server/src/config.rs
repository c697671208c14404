//! Server configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the emotive server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Path to the ONNX model artifact.
    pub model_path: PathBuf,
    /// Directory where uploads are staged for the lifetime of one request.
    pub staging_dir: PathBuf,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            model_path: PathBuf::from("model.onnx"),
            staging_dir: std::env::temp_dir(),
            max_upload_bytes: 10 * 1024 * 1024, // 10 MB — generous for a 3s clip
        }
    }
}
