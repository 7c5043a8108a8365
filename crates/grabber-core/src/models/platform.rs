use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported source platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    Instagram,
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Platform::YouTube => write!(f, "youtube"),
            Platform::Instagram => write!(f, "instagram"),
        }
    }
}

/// Ordered platform signatures. Patterns are mutually exclusive; first match wins.
static PLATFORM_SIGNATURES: LazyLock<Vec<(Platform, Regex)>> = LazyLock::new(|| {
    [
        (
            Platform::YouTube,
            r"^https?://(www\.)?youtube\.com/watch\?v=[\w-]+",
        ),
        (Platform::YouTube, r"^https?://youtu\.be/[\w-]+"),
        (
            Platform::YouTube,
            r"^https?://(www\.)?youtube\.com/shorts/[\w-]+",
        ),
        (
            Platform::Instagram,
            r"^https?://(www\.)?instagram\.com/(p|reel|reels)/[\w-]+",
        ),
    ]
    .into_iter()
    .map(|(platform, pattern)| {
        (
            platform,
            Regex::new(pattern).expect("platform signature pattern is valid"),
        )
    })
    .collect()
});

impl Platform {
    /// Classify a URL against the known signatures. Performs no network access.
    pub fn detect(url: &str) -> Option<Platform> {
        PLATFORM_SIGNATURES
            .iter()
            .find(|(_, re)| re.is_match(url))
            .map(|(platform, _)| *platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_youtube_variants() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?v=abc-123_x",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/abcDEF123",
        ] {
            assert_eq!(Platform::detect(url), Some(Platform::YouTube), "{url}");
        }
    }

    #[test]
    fn test_detect_instagram_variants() {
        for url in [
            "https://www.instagram.com/p/C1a2b3c4/",
            "https://instagram.com/reel/Cxyz_123",
            "https://www.instagram.com/reels/Cxyz-123",
        ] {
            assert_eq!(Platform::detect(url), Some(Platform::Instagram), "{url}");
        }
    }

    #[test]
    fn test_detect_rejects_other_urls() {
        for url in [
            "https://www.tiktok.com/@user/video/123",
            "https://www.youtube.com/channel/UC123",
            "https://www.instagram.com/someuser/",
            "ftp://youtube.com/watch?v=abc",
            "https://m.youtube.com/watch?v=abc",
        ] {
            assert_eq!(Platform::detect(url), None, "{url}");
        }
    }

    #[test]
    fn test_platform_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Platform::YouTube).unwrap(),
            "\"youtube\""
        );
        assert_eq!(Platform::Instagram.to_string(), "instagram");
    }
}
