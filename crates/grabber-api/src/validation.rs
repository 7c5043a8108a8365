//! Request validation for the pipeline endpoints.
//!
//! All failed rules are reported together, joined with `"; "`, as one
//! `VALIDATION_ERROR`.

use std::sync::LazyLock;

use grabber_core::constants::{FORMAT_ID_MAX_LENGTH, URL_MAX_LENGTH};
use grabber_core::AppError;
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{ValidateLength, ValidateUrl};

static VIDEO_HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?(youtube\.com|youtu\.be|instagram\.com)/")
        .expect("video host pattern is valid")
});

static FORMAT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w+-]+$").expect("format id pattern is valid"));

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VideoInfoRequest {
    /// YouTube or Instagram video URL
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub url: String,
    /// Format id as listed in the video info response
    pub format_id: String,
}

#[allow(clippy::ptr_arg)]
fn check_url(url: &String, problems: &mut Vec<&'static str>) {
    if url.is_empty() {
        problems.push("URL is required");
        return;
    }
    if !url.validate_length(None, Some(URL_MAX_LENGTH), None) {
        problems.push("URL must be at most 2048 characters");
    }
    if !url.validate_url() {
        problems.push("Invalid URL format");
    }
}

fn into_result(problems: Vec<&'static str>) -> Result<(), AppError> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(problems.join("; ")))
    }
}

impl VideoInfoRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut problems = Vec::new();
        check_url(&self.url, &mut problems);
        if !self.url.is_empty() && !VIDEO_HOST_PATTERN.is_match(&self.url) {
            problems.push("Only YouTube and Instagram URLs are supported");
        }
        into_result(problems)
    }
}

impl DownloadRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut problems = Vec::new();
        check_url(&self.url, &mut problems);

        if self.format_id.is_empty() {
            problems.push("Format ID is required");
        } else {
            if !self
                .format_id
                .validate_length(None, Some(FORMAT_ID_MAX_LENGTH), None)
            {
                problems.push("Format ID too long");
            }
            if !FORMAT_ID_PATTERN.is_match(&self.format_id) {
                problems.push("Invalid format ID");
            }
        }

        into_result(problems)
    }
}
