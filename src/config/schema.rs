//! Configuration schema for shaderkit
//!
//! Configuration is stored at `~/.config/shaderkit/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Filesystem locations
    pub paths: PathsConfig,

    /// Shader service and upload endpoints
    pub remote: RemoteConfig,

    /// Emulator binary expectations
    pub emulator: EmulatorConfig,
}

/// General application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
}

/// Filesystem locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Emulator data directory (holds `games/` and `Config.json`)
    pub data_root: Option<PathBuf>,
}

impl PathsConfig {
    /// Configured data root, or the emulator's default location
    pub fn data_root(&self) -> PathBuf {
        self.data_root.clone().unwrap_or_else(default_data_root)
    }
}

/// The emulator's own default data directory
pub fn default_data_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Ryujinx")
}

/// Remote endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the shader service API
    pub api_url: String,

    /// Multipart upload endpoint for shared caches
    pub upload_url: String,

    /// Skip TLS certificate validation for the upload endpoint only.
    ///
    /// Some upload hosts serve certificate chains that do not validate.
    /// Leave this off unless the configured host requires it.
    pub insecure_upload: bool,

    /// User agent sent with every request
    pub user_agent: String,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.emusak.dev/v2".to_string(),
            upload_url: "https://api.anonfiles.com/upload".to_string(),
            insecure_upload: false,
            user_agent: format!("shaderkit/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 15,
        }
    }
}

/// Emulator expectations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Substring the selected binary's file name must contain (case-insensitive)
    pub binary_name: String,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            binary_name: "ryujinx".to_string(),
        }
    }
}
