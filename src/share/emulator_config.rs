//! Forcing the emulator to log what the supervisor needs to see

use crate::error::{ShaderkitError, ShaderkitResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Config file written by the LDN build of the emulator; wins when present
pub const LDN_CONFIG_FILE: &str = "LDNConfig.json";

/// Config file written by the standard build
pub const STANDARD_CONFIG_FILE: &str = "Config.json";

/// Flags that make the emulator print title and shader cache lines
pub const LOGGING_FLAGS: [&str; 6] = [
    "logging_enable_error",
    "logging_enable_guest",
    "logging_enable_info",
    "logging_enable_stub",
    "logging_enable_warn",
    "logging_enable_fs_access_log",
];

/// The config file the emulator will read on its next start
pub async fn active_config_path(data_root: &Path) -> ShaderkitResult<PathBuf> {
    for name in [LDN_CONFIG_FILE, STANDARD_CONFIG_FILE] {
        let path = data_root.join(name);
        let exists = fs::try_exists(&path)
            .await
            .map_err(|e| ShaderkitError::io(format!("checking {}", path.display()), e))?;
        if exists {
            return Ok(path);
        }
    }
    Err(ShaderkitError::EmulatorConfigNotFound(data_root.to_path_buf()))
}

/// Turn on every logging flag in the active config and write it back in place.
///
/// Unrelated keys and their order are preserved. There is no file lock: two
/// concurrent shares against one data root can lose an update.
pub async fn enable_logging(data_root: &Path) -> ShaderkitResult<PathBuf> {
    let path = active_config_path(data_root).await?;
    let raw = fs::read_to_string(&path)
        .await
        .map_err(|e| ShaderkitError::io(format!("reading {}", path.display()), e))?;

    let mut config: Value =
        serde_json::from_str(&raw).map_err(|e| ShaderkitError::EmulatorConfigInvalid {
            path: path.clone(),
            reason: e.to_string(),
        })?;
    let object = config
        .as_object_mut()
        .ok_or_else(|| ShaderkitError::EmulatorConfigInvalid {
            path: path.clone(),
            reason: "top level is not an object".to_string(),
        })?;

    for flag in LOGGING_FLAGS {
        object.insert(flag.to_string(), Value::Bool(true));
    }
    debug!("Enabled {} logging flags", LOGGING_FLAGS.len());

    let content = serde_json::to_string_pretty(&config)?;
    fs::write(&path, content)
        .await
        .map_err(|e| ShaderkitError::io(format!("writing {}", path.display()), e))?;

    info!("Emulator logging enabled in {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn enables_all_flags_and_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STANDARD_CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{"version": 40, "logging_enable_info": false, "game_dirs": ["/games"]}"#,
        )
        .unwrap();

        let written = enable_logging(dir.path()).await.unwrap();
        assert_eq!(written, path);

        let config: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        for flag in LOGGING_FLAGS {
            assert_eq!(config[flag], Value::Bool(true), "{flag} not enabled");
        }
        assert_eq!(config["version"], 40);
        assert_eq!(config["game_dirs"][0], "/games");

        let keys: Vec<&String> = config.as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "version");
    }

    #[tokio::test]
    async fn ldn_config_wins_and_standard_is_untouched() {
        let dir = TempDir::new().unwrap();
        let standard = dir.path().join(STANDARD_CONFIG_FILE);
        let ldn = dir.path().join(LDN_CONFIG_FILE);
        std::fs::write(&standard, r#"{"logging_enable_warn": false}"#).unwrap();
        std::fs::write(&ldn, r#"{"ldn": true}"#).unwrap();

        let written = enable_logging(dir.path()).await.unwrap();

        assert_eq!(written, ldn);
        assert_eq!(
            std::fs::read_to_string(&standard).unwrap(),
            r#"{"logging_enable_warn": false}"#
        );
        let config: Value = serde_json::from_str(&std::fs::read_to_string(&ldn).unwrap()).unwrap();
        assert_eq!(config["ldn"], true);
        assert_eq!(config["logging_enable_fs_access_log"], true);
    }

    #[tokio::test]
    async fn missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = enable_logging(dir.path()).await.unwrap_err();
        assert!(matches!(err, ShaderkitError::EmulatorConfigNotFound(_)));
    }

    #[tokio::test]
    async fn non_object_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(STANDARD_CONFIG_FILE), "[1, 2, 3]").unwrap();
        let err = enable_logging(dir.path()).await.unwrap_err();
        assert!(matches!(err, ShaderkitError::EmulatorConfigInvalid { .. }));
    }
}
