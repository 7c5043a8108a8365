//! Shared key generation for storage backends.
//!
//! Key format: `downloads/{uuid}/{file_name}`.

use grabber_core::constants::DOWNLOADS_STORAGE_PREFIX;
use uuid::Uuid;

const MAX_FILE_NAME_LEN: usize = 200;

/// Make a provider-supplied file name safe to embed in a storage key.
///
/// Path separators, control characters and leading dots are replaced so the
/// name can never introduce extra key segments or traversal.
pub fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim().trim_start_matches('.').replace("..", "_");

    let truncated: String = if cleaned.chars().count() > MAX_FILE_NAME_LEN {
        // Keep the extension when truncating.
        match cleaned.rsplit_once('.') {
            Some((stem, ext)) if ext.len() < 16 => {
                let keep = MAX_FILE_NAME_LEN.saturating_sub(ext.chars().count() + 1);
                format!("{}.{}", stem.chars().take(keep).collect::<String>(), ext)
            }
            _ => cleaned.chars().take(MAX_FILE_NAME_LEN).collect(),
        }
    } else {
        cleaned
    };

    if truncated.is_empty() {
        "download".to_string()
    } else {
        truncated
    }
}

/// Generate a fresh storage key for one download attempt.
pub fn generate_download_key(file_name: &str) -> String {
    format!(
        "{}/{}/{}",
        DOWNLOADS_STORAGE_PREFIX,
        Uuid::new_v4(),
        sanitize_file_name(file_name)
    )
}
