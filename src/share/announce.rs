//! Announcement posted after a successful share

use crate::title::TitleId;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

/// Obfuscate a link so chat filters do not unfurl or block it.
///
/// This is an encoding, not encryption: anyone can reverse it.
pub fn encode_link(link: &str) -> String {
    STANDARD.encode(link)
}

/// Reverse [`encode_link`]
pub fn decode_link(encoded: &str) -> Option<String> {
    STANDARD
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Everything the share announcement mentions
#[derive(Debug, Clone)]
pub struct Announcement<'a> {
    pub app_version: &'a str,
    pub title_name: &'a str,
    pub title: &'a TitleId,
    pub emulator_version: Option<&'a str>,
    pub local_count: u64,
    pub remote_count: u64,
    pub short_link: &'a str,
}

impl fmt::Display for Announcement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hey there, I'm sharing my shaders using shaderkit v{} for **{}**",
            self.app_version, self.title_name
        )?;
        if let Some(version) = self.emulator_version {
            write!(f, " v{}", version)?;
        }
        write!(
            f,
            " ({}). I have {} shaders while the shared cache has {} shaders. Download them from here : `{}`",
            self.title.upper(),
            self.local_count,
            self.remote_count,
            encode_link(self.short_link)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_encoding_roundtrips() {
        let link = "https://files.example/abc123";
        let encoded = encode_link(link);
        assert_ne!(encoded, link);
        assert_eq!(decode_link(&encoded).as_deref(), Some(link));
        assert_eq!(decode_link("***"), None);
    }

    #[test]
    fn message_mentions_every_fact() {
        let title = TitleId::new("0100abcd").unwrap();
        let message = Announcement {
            app_version: "0.3.0",
            title_name: "Super Game",
            title: &title,
            emulator_version: Some("1.2.0"),
            local_count: 42,
            remote_count: 17,
            short_link: "https://files.example/abc",
        }
        .to_string();

        assert!(message.contains("shaderkit v0.3.0"));
        assert!(message.contains("**Super Game** v1.2.0"));
        assert!(message.contains("(0100ABCD)"));
        assert!(message.contains("I have 42 shaders"));
        assert!(message.contains("has 17 shaders"));
        assert!(message.contains(&encode_link("https://files.example/abc")));
        assert!(!message.contains("https://files.example/abc"));
    }

    #[test]
    fn message_without_version() {
        let title = TitleId::new("0100ABCD").unwrap();
        let message = Announcement {
            app_version: "0.3.0",
            title_name: "0100ABCD",
            title: &title,
            emulator_version: None,
            local_count: 1,
            remote_count: 0,
            short_link: "x",
        }
        .to_string();
        assert!(message.contains("**0100ABCD** (0100ABCD)"));
    }
}
