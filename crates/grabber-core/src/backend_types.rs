use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Selects where uploaded artifacts live and how their signed links are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// Cache backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Postgres,
}

impl FromStr for CacheBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "postgres" | "postgresql" => Ok(CacheBackend::Postgres),
            _ => Err(anyhow::anyhow!("Invalid cache backend: {}", s)),
        }
    }
}

impl Display for CacheBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CacheBackend::Memory => write!(f, "memory"),
            CacheBackend::Postgres => write!(f, "postgres"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(
            "local".parse::<StorageBackend>().unwrap(),
            StorageBackend::Local
        );
        assert!("nfs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_cache_backend_parse_and_display() {
        assert_eq!(
            "postgresql".parse::<CacheBackend>().unwrap(),
            CacheBackend::Postgres
        );
        assert_eq!(CacheBackend::Memory.to_string(), "memory");
        assert!("redis".parse::<CacheBackend>().is_err());
    }
}
