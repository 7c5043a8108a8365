//! Translation from provider output to canonical metadata.

use grabber_core::{SupportedUrl, VideoFormatDescriptor, VideoMetadata};

use crate::provider::{ProviderFormat, ProviderMetadata};

const UNKNOWN_QUALITY: &str = "unknown";
const UNKNOWN_UPLOADER: &str = "Unknown";

fn codec_present(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if c != "none")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn size_bytes(value: Option<f64>) -> Option<u64> {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.round() as u64)
}

/// Map one provider format. Returns `None` for formats with neither stream.
pub fn to_format_descriptor(format: ProviderFormat) -> Option<VideoFormatDescriptor> {
    let has_audio = codec_present(format.acodec.as_deref());
    let has_video = codec_present(format.vcodec.as_deref());
    if !has_audio && !has_video {
        return None;
    }

    let resolution = match (format.width, format.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some(format!("{}x{}", w, h)),
        _ => non_empty(format.resolution),
    };

    Some(VideoFormatDescriptor {
        format_id: format.format_id,
        extension: format.ext,
        quality_label: non_empty(format.format_note)
            .unwrap_or_else(|| UNKNOWN_QUALITY.to_string()),
        resolution,
        approx_size_bytes: size_bytes(format.filesize).or(size_bytes(format.filesize_approx)),
        has_audio,
        has_video,
    })
}

/// Build canonical metadata for `url` from provider output.
pub fn to_video_metadata(
    provider: ProviderMetadata,
    url: &SupportedUrl,
    fetched_at_epoch_ms: i64,
) -> VideoMetadata {
    let duration_seconds = provider
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d.round() as u64)
        .unwrap_or(0);

    VideoMetadata {
        id: provider.id,
        title: provider.title,
        description: provider.description.unwrap_or_default(),
        thumbnail_url: provider.thumbnail.unwrap_or_default(),
        duration_seconds,
        platform: url.platform(),
        uploader: non_empty(provider.uploader).unwrap_or_else(|| UNKNOWN_UPLOADER.to_string()),
        formats: provider
            .formats
            .into_iter()
            .filter_map(to_format_descriptor)
            .collect(),
        source_url: url.as_str().to_string(),
        fetched_at_epoch_ms,
    }
}
