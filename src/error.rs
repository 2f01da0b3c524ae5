//! Error types for shaderkit
//!
//! All library modules use `ShaderkitResult<T>` as their return type.
//! Expected transfer failures are not errors: they surface as
//! [`TransferOutcome`](crate::transfer::TransferOutcome) values instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shaderkit operations
pub type ShaderkitResult<T> = Result<T, ShaderkitError>;

/// All errors that can occur in shaderkit
#[derive(Error, Debug)]
pub enum ShaderkitError {
    // Input errors
    #[error("Invalid title id: {0:?}")]
    InvalidTitleId(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Emulator configuration not found in {0}")]
    EmulatorConfigNotFound(PathBuf),

    #[error("Invalid emulator configuration at {path}: {reason}")]
    EmulatorConfigInvalid { path: PathBuf, reason: String },

    // Archive errors
    #[error("Failed to write archive {path}: {reason}")]
    ArchiveWrite { path: PathBuf, reason: String },

    #[error("Archive is corrupt: {path}: {reason}")]
    ArchiveCorrupt { path: PathBuf, reason: String },

    // Process errors
    #[error("Failed to launch {binary}")]
    SupervisorSpawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed reading emulator output")]
    SupervisorStream(#[source] std::io::Error),

    // Remote errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote returned {status} for {url}")]
    RemoteStatus { url: String, status: u16 },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ShaderkitError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an archive write error
    pub fn archive_write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArchiveWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidTitleId(_) => Some("Title ids look like 0100ABCDEF123000"),
            Self::EmulatorConfigNotFound(_) => {
                Some("Start the emulator once so it writes Config.json, or check paths.data_root")
            }
            Self::ArchiveWrite { .. } => {
                Some("Run the game in the emulator first so its shader cache exists")
            }
            Self::SupervisorSpawn { .. } => Some("Check that the emulator binary is executable"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ShaderkitError::InvalidTitleId("  ".to_string());
        assert!(err.to_string().contains("Invalid title id"));
    }

    #[test]
    fn error_hint() {
        let err = ShaderkitError::archive_write("/tmp/upload.zip", "missing cache.info");
        assert!(err.hint().is_some());
        assert!(err.to_string().contains("missing cache.info"));
    }

    #[test]
    fn io_error_keeps_context() {
        let err = ShaderkitError::io(
            "writing cache.info",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert_eq!(err.to_string(), "IO error: writing cache.info");
        assert!(err.hint().is_none());
    }
}
