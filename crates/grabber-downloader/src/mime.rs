//! Mime type detection for downloaded files.

use std::path::Path;

const OCTET_STREAM: &str = "application/octet-stream";

/// Mime type for a downloaded file, keyed on its extension.
///
/// Common media containers use a fixed table; anything else is guessed and
/// falls back to `application/octet-stream`.
pub fn mime_for_file_name(file_name: &str) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let Some(ext) = ext else {
        return OCTET_STREAM.to_string();
    };

    let known = match ext.as_str() {
        "mp4" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        "mkv" => Some("video/x-matroska"),
        "m4a" => Some("audio/mp4"),
        "mp3" => Some("audio/mpeg"),
        "ogg" => Some("audio/ogg"),
        "wav" => Some("audio/wav"),
        _ => None,
    };

    match known {
        Some(mime) => mime.to_string(),
        None => mime_guess::from_ext(&ext)
            .first_raw()
            .unwrap_or(OCTET_STREAM)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_media_extensions() {
        assert_eq!(mime_for_file_name("clip.mp4"), "video/mp4");
        assert_eq!(mime_for_file_name("clip.WEBM"), "video/webm");
        assert_eq!(mime_for_file_name("clip.mkv"), "video/x-matroska");
        assert_eq!(mime_for_file_name("track.m4a"), "audio/mp4");
        assert_eq!(mime_for_file_name("track.mp3"), "audio/mpeg");
        assert_eq!(mime_for_file_name("track.ogg"), "audio/ogg");
        assert_eq!(mime_for_file_name("track.wav"), "audio/wav");
    }

    #[test]
    fn test_unknown_extensions_fall_back() {
        assert_eq!(mime_for_file_name("noext"), "application/octet-stream");
        assert_eq!(
            mime_for_file_name("blob.zzzunknown"),
            "application/octet-stream"
        );
        assert_eq!(mime_for_file_name("page.html"), "text/html");
    }
}
