use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::platform::Platform;

/// One downloadable rendition of a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoFormatDescriptor {
    pub format_id: String,
    pub extension: String,
    pub quality_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approx_size_bytes: Option<u64>,
    pub has_audio: bool,
    pub has_video: bool,
}

impl VideoFormatDescriptor {
    /// Formats with neither an audio nor a video stream are never exposed.
    pub fn is_exposable(&self) -> bool {
        self.has_audio || self.has_video
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub duration_seconds: u64,
    pub platform: Platform,
    pub uploader: String,
    pub formats: Vec<VideoFormatDescriptor>,
    pub source_url: String,
    pub fetched_at_epoch_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_descriptor_wire_shape() {
        let format = VideoFormatDescriptor {
            format_id: "140".to_string(),
            extension: "m4a".to_string(),
            quality_label: "medium".to_string(),
            resolution: None,
            approx_size_bytes: Some(1024),
            has_audio: true,
            has_video: false,
        };
        let json = serde_json::to_value(&format).unwrap();
        assert_eq!(json["formatId"], "140");
        assert_eq!(json["approxSizeBytes"], 1024);
        assert_eq!(json["hasVideo"], false);
        assert!(json.get("resolution").is_none());
        assert!(format.is_exposable());
    }

    #[test]
    fn test_format_without_streams_is_not_exposable() {
        let format = VideoFormatDescriptor {
            format_id: "sb0".to_string(),
            extension: "mhtml".to_string(),
            quality_label: "storyboard".to_string(),
            resolution: None,
            approx_size_bytes: None,
            has_audio: false,
            has_video: false,
        };
        assert!(!format.is_exposable());
    }
}
