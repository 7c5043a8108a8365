use std::fmt::{Display, Formatter, Result as FmtResult};

use super::platform::Platform;
use crate::error::AppError;

/// A URL known to belong to a supported platform.
///
/// `parse` is the only constructor, so an instance never exists for an
/// unsupported platform or a syntactically invalid URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SupportedUrl {
    normalized_url: String,
    platform: Platform,
}

impl SupportedUrl {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();

        if url::Url::parse(trimmed).is_err() {
            return Err(AppError::UnsupportedPlatform(format!(
                "Invalid URL: {}",
                trimmed
            )));
        }

        let platform = Platform::detect(trimmed).ok_or_else(|| {
            AppError::UnsupportedPlatform(format!("Unsupported platform for URL: {}", trimmed))
        })?;

        Ok(Self {
            normalized_url: trimmed.to_string(),
            platform,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.normalized_url
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }
}

impl Display for SupportedUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.normalized_url)
    }
}
