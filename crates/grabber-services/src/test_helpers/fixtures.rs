use grabber_downloader::{ProviderFormat, ProviderMetadata};

pub const YOUTUBE_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const INSTAGRAM_URL: &str = "https://www.instagram.com/reel/Cabc123/";

/// Provider output with one muxed, one audio-only and one storyboard format.
pub fn sample_provider_metadata() -> ProviderMetadata {
    ProviderMetadata {
        id: "dQw4w9WgXcQ".to_string(),
        title: "Sample clip".to_string(),
        description: Some("A sample".to_string()),
        thumbnail: Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hq.jpg".to_string()),
        duration: Some(212.0),
        uploader: Some("Sample Channel".to_string()),
        webpage_url: Some(YOUTUBE_URL.to_string()),
        formats: vec![
            ProviderFormat {
                format_id: "18".to_string(),
                ext: "mp4".to_string(),
                format_note: Some("360p".to_string()),
                width: Some(640),
                height: Some(360),
                filesize: Some(1_048_576.0),
                acodec: Some("mp4a.40.2".to_string()),
                vcodec: Some("avc1.42001E".to_string()),
                ..ProviderFormat::default()
            },
            ProviderFormat {
                format_id: "140".to_string(),
                ext: "m4a".to_string(),
                format_note: Some("medium".to_string()),
                resolution: Some("audio only".to_string()),
                filesize_approx: Some(3_400_000.0),
                acodec: Some("mp4a.40.2".to_string()),
                vcodec: Some("none".to_string()),
                ..ProviderFormat::default()
            },
            ProviderFormat {
                format_id: "sb0".to_string(),
                ext: "mhtml".to_string(),
                format_note: Some("storyboard".to_string()),
                acodec: Some("none".to_string()),
                vcodec: Some("none".to_string()),
                ..ProviderFormat::default()
            },
        ],
    }
}
