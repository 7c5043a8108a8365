//! Media Grabber Storage Library
//!
//! Storage abstraction for downloaded artifacts plus S3 and local filesystem
//! implementations. Every backend can issue a time-limited signed GET link.
//!
//! # Storage key format
//!
//! Artifacts are stored under `downloads/{uuid}/{file_name}` with a fresh uuid
//! per download attempt, so concurrent downloads never share a key. Keys must
//! not contain `..` or a leading `/`. Key generation lives in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signed_token;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, StorageHandles};
pub use grabber_core::StorageBackend;
pub use keys::{generate_download_key, sanitize_file_name};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
