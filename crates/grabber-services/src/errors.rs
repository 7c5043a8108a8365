//! Mapping of collaborator failures into the closed error set.

use grabber_core::AppError;
use grabber_downloader::DownloaderError;
use grabber_storage::StorageError;

pub(crate) fn metadata_error(err: DownloaderError) -> AppError {
    AppError::VideoNotFound(format!("Could not fetch video info: {}", err))
}

pub(crate) fn download_error(err: DownloaderError) -> AppError {
    AppError::Download(format!("Download failed: {}", err))
}

pub(crate) fn storage_error(err: StorageError) -> AppError {
    AppError::Download(format!("Storage failure: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grabber_core::ErrorMetadata;

    #[test]
    fn test_collaborator_errors_map_to_taxonomy() {
        let err = metadata_error(DownloaderError::NoOutputFile);
        assert_eq!(err.error_code(), "VIDEO_NOT_FOUND");
        assert!(err.client_message().starts_with("Could not fetch video info:"));

        let err = download_error(DownloaderError::NoOutputFile);
        assert_eq!(err.error_code(), "DOWNLOAD_ERROR");
        assert_eq!(err.client_message(), "Download failed: No file was downloaded");

        let err = storage_error(StorageError::UploadFailed("boom".to_string()));
        assert_eq!(err.error_code(), "DOWNLOAD_ERROR");
        assert!(err.client_message().starts_with("Storage failure:"));
    }
}
