//! Title identifiers and the on-disk cache layout derived from them

use crate::error::{ShaderkitError, ShaderkitResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Case-insensitive identifier of a game or application.
///
/// Stored trimmed as given. Use [`TitleId::lower`] for filesystem paths and
/// [`TitleId::upper`] for remote API calls.
#[derive(Debug, Clone, Eq)]
pub struct TitleId(String);

impl TitleId {
    /// Parse a title id.
    ///
    /// Only ASCII letters and digits are accepted, since the id becomes a
    /// directory name under the data root.
    pub fn new(raw: impl AsRef<str>) -> ShaderkitResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ShaderkitError::InvalidTitleId(raw.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Lowercase form, used for directory names
    pub fn lower(&self) -> String {
        self.0.to_lowercase()
    }

    /// Uppercase form, used for remote requests and announcements
    pub fn upper(&self) -> String {
        self.0.to_uppercase()
    }

    /// Case-insensitive comparison against raw text
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }

    /// The id as given
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for TitleId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl std::hash::Hash for TitleId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.lower().hash(state);
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TitleId {
    type Err = ShaderkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Paths of one title's shader cache under a data root.
///
/// Always derived from `(data_root, title)`; never cached elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    shader_dir: PathBuf,
}

impl CachePaths {
    pub fn new(data_root: &Path, title: &TitleId) -> Self {
        Self {
            shader_dir: data_root
                .join("games")
                .join(title.lower())
                .join("cache")
                .join("shader"),
        }
    }

    /// Directory holding the guest program cache and its sidecar
    pub fn program_dir(&self) -> PathBuf {
        self.shader_dir.join("guest").join("program")
    }

    /// The shader archive (`cache.zip`)
    pub fn archive(&self) -> PathBuf {
        self.program_dir().join("cache.zip")
    }

    /// The info sidecar (`cache.info`)
    pub fn info(&self) -> PathBuf {
        self.program_dir().join("cache.info")
    }

    /// Upload artifact written next to the sidecar
    pub fn upload_artifact(&self) -> PathBuf {
        self.program_dir().join("upload.zip")
    }

    /// Host-compiled cache that must be invalidated whenever the guest cache changes
    pub fn legacy_dir(&self) -> PathBuf {
        self.shader_dir.join("opengl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_id_rejects_blank() {
        assert!(TitleId::new("").is_err());
        assert!(TitleId::new("   ").is_err());
    }

    #[test]
    fn title_id_rejects_path_segments() {
        for raw in ["..", "../etc", "0100/../..", "01\\00", "a b", "0100ABCD.", "0100é"] {
            assert!(TitleId::new(raw).is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn cache_paths_stay_under_data_root() {
        let title = TitleId::new("0100ABCDEF123000").unwrap();
        let paths = CachePaths::new(Path::new("/data"), &title);
        assert!(paths.legacy_dir().starts_with("/data/games/0100abcdef123000"));
        assert!(paths.archive().starts_with("/data/games/0100abcdef123000"));
    }

    #[test]
    fn title_id_canonical_forms() {
        let title = TitleId::new(" 0100abCD ").unwrap();
        assert_eq!(title.lower(), "0100abcd");
        assert_eq!(title.upper(), "0100ABCD");
        assert_eq!(title.as_str(), "0100abCD");
    }

    #[test]
    fn title_id_equality_ignores_case() {
        let a: TitleId = "0100ABCD".parse().unwrap();
        let b: TitleId = "0100abcd".parse().unwrap();
        assert_eq!(a, b);
        assert!(a.matches("0100aBcD\n"));
        assert!(!a.matches("0100ABCE"));
    }

    #[test]
    fn cache_paths_layout() {
        let title = TitleId::new("0100ABCD").unwrap();
        let paths = CachePaths::new(Path::new("/data"), &title);
        assert_eq!(
            paths.archive(),
            PathBuf::from("/data/games/0100abcd/cache/shader/guest/program/cache.zip")
        );
        assert_eq!(
            paths.info(),
            PathBuf::from("/data/games/0100abcd/cache/shader/guest/program/cache.info")
        );
        assert_eq!(
            paths.upload_artifact(),
            PathBuf::from("/data/games/0100abcd/cache/shader/guest/program/upload.zip")
        );
        assert_eq!(
            paths.legacy_dir(),
            PathBuf::from("/data/games/0100abcd/cache/shader/opengl")
        );
    }
}
