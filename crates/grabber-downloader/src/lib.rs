//! Media Grabber Downloader
//!
//! The `VideoDownloader` port and its yt-dlp implementation. Provider output is
//! described by [`ProviderMetadata`] and translated into the canonical
//! [`grabber_core::VideoMetadata`] by [`mapping::to_video_metadata`], so nothing
//! provider-shaped leaks past this crate.

pub mod error;
pub mod mapping;
pub mod mime;
pub mod provider;
pub mod traits;
pub mod ytdlp;

pub use error::{DownloaderError, DownloaderResult};
pub use mapping::to_video_metadata;
pub use mime::mime_for_file_name;
pub use provider::{ProviderFormat, ProviderMetadata};
pub use traits::VideoDownloader;
pub use ytdlp::YtDlpDownloader;
