use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::backend_types::{CacheBackend, StorageBackend};
use crate::constants::{
    DEFAULT_CACHE_SWEEP_INTERVAL_SECS, DEFAULT_DOWNLOADER_TIMEOUT_SECONDS,
    DEFAULT_DOWNLOAD_LINK_LIFETIME_MINUTES, DEFAULT_RATE_LIMIT_MAX_REQUESTS,
    DEFAULT_RATE_LIMIT_WINDOW_SECONDS, DEFAULT_VIDEO_INFO_TTL_SECONDS,
};

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:5000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Maximum in-flight HTTP requests; `None` disables the limit.
    pub concurrency_limit: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            environment: "development".to_string(),
            cors_origins: split_list(DEFAULT_CORS_ORIGINS),
            concurrency_limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECONDS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub database_url: Option<String>,
    pub sweep_interval: Duration,
    pub video_info_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            database_url: None,
            sweep_interval: Duration::from_secs(DEFAULT_CACHE_SWEEP_INTERVAL_SECS),
            video_info_ttl: Duration::from_secs(DEFAULT_VIDEO_INFO_TTL_SECONDS),
        }
    }
}

/// Lifetime shared by the signed link, the cached grant and the remote object.
#[derive(Debug, Clone, Copy)]
pub struct DownloadConfig {
    pub link_lifetime: Duration,
}

impl DownloadConfig {
    /// Cache TTL for grants. Always equal to the link lifetime.
    pub fn cache_ttl(&self) -> Duration {
        self.link_lifetime
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            link_lifetime: Duration::from_secs(DEFAULT_DOWNLOAD_LINK_LIFETIME_MINUTES * 60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_base_url: Option<String>,
    pub signing_secret: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("./storage".to_string()),
            local_base_url: Some("http://localhost:8080/files".to_string()),
            signing_secret: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    pub ytdlp_path: String,
    pub temp_dir: PathBuf,
    pub timeout: Duration,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            temp_dir: env::temp_dir(),
            timeout: Duration::from_secs(DEFAULT_DOWNLOADER_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub download: DownloadConfig,
    pub storage: StorageConfig,
    pub downloader: DownloaderConfig,
    /// `json` switches the log output to JSON lines.
    pub log_format: Option<String>,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.server.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const PORT: u16 = 8080;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str =
            env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let server = ServerConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| PORT.to_string())
                .parse()
                .unwrap_or(PORT),
            environment,
            cors_origins: split_list(&cors_origins_str),
            concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|&n| n > 0),
        };

        let rate_limit = RateLimitConfig {
            max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|_| DEFAULT_RATE_LIMIT_MAX_REQUESTS.to_string())
                .parse()
                .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS),
            window: Duration::from_secs(
                env::var("RATE_LIMIT_WINDOW_SECONDS")
                    .unwrap_or_else(|_| DEFAULT_RATE_LIMIT_WINDOW_SECONDS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECONDS),
            ),
        };

        let cache = CacheConfig {
            backend: env::var("CACHE_BACKEND")
                .unwrap_or_else(|_| "memory".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL").ok(),
            sweep_interval: Duration::from_secs(
                env::var("CACHE_SWEEP_INTERVAL_SECS")
                    .unwrap_or_else(|_| DEFAULT_CACHE_SWEEP_INTERVAL_SECS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_CACHE_SWEEP_INTERVAL_SECS),
            ),
            video_info_ttl: Duration::from_secs(
                env::var("VIDEO_INFO_CACHE_TTL_SECONDS")
                    .unwrap_or_else(|_| DEFAULT_VIDEO_INFO_TTL_SECONDS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_VIDEO_INFO_TTL_SECONDS),
            ),
        };

        let download = DownloadConfig {
            link_lifetime: Duration::from_secs(
                env::var("DOWNLOAD_LINK_LIFETIME_MINUTES")
                    .unwrap_or_else(|_| DEFAULT_DOWNLOAD_LINK_LIFETIME_MINUTES.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_DOWNLOAD_LINK_LIFETIME_MINUTES)
                    * 60,
            ),
        };

        let storage = StorageConfig {
            backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "local".to_string())
                .parse()?,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: Some(
                env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./storage".to_string()),
            ),
            local_base_url: Some(env::var("LOCAL_STORAGE_BASE_URL").unwrap_or_else(|_| {
                format!("http://localhost:{}/files", server.port)
            })),
            signing_secret: env::var("STORAGE_SIGNING_SECRET").ok(),
        };

        let downloader = DownloaderConfig {
            ytdlp_path: env::var("YTDLP_PATH").unwrap_or_else(|_| "yt-dlp".to_string()),
            temp_dir: env::var("DOWNLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            timeout: Duration::from_secs(
                env::var("DOWNLOADER_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| DEFAULT_DOWNLOADER_TIMEOUT_SECONDS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_DOWNLOADER_TIMEOUT_SECONDS),
            ),
        };

        let config = Config {
            server,
            rate_limit,
            cache,
            download,
            storage,
            downloader,
            log_format: env::var("LOG_FORMAT").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.rate_limit.max_requests == 0 {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_MAX_REQUESTS must be greater than 0"
            ));
        }

        if self.rate_limit.window.is_zero() {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_WINDOW_SECONDS must be greater than 0"
            ));
        }

        if self.download.link_lifetime.is_zero() {
            return Err(anyhow::anyhow!(
                "DOWNLOAD_LINK_LIFETIME_MINUTES must be greater than 0"
            ));
        }

        if self.cache.video_info_ttl.is_zero() {
            return Err(anyhow::anyhow!(
                "VIDEO_INFO_CACHE_TTL_SECONDS must be greater than 0"
            ));
        }

        if self.cache.backend == CacheBackend::Postgres {
            match self.cache.database_url.as_deref() {
                Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {}
                _ => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string when CACHE_BACKEND=postgres"
                    ))
                }
            }
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.as_deref().unwrap_or("").is_empty() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET is required when STORAGE_BACKEND=s3"
                    ));
                }
            }
            StorageBackend::Local => {
                let secret = self.storage.signing_secret.as_deref().unwrap_or("");
                if self.is_production() && secret.len() < 32 {
                    return Err(anyhow::anyhow!(
                        "STORAGE_SIGNING_SECRET must be at least 32 characters long in production"
                    ));
                }
            }
        }

        if self.downloader.timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "DOWNLOADER_TIMEOUT_SECONDS must be greater than 0"
            ));
        }

        Ok(())
    }

    pub fn json_logs(&self) -> bool {
        self.log_format
            .as_deref()
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
