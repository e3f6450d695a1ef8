//! Registry configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

pub const DEFAULT_CACHE_PATH: &str = ".ossa/cache/agents.json";
pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_MAX_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Snapshot file; the access-count file sits next to it.
    pub cache_path: PathBuf,
    /// Snapshots older than this are discarded on load.
    pub ttl_secs: u64,
    pub max_size: usize,
    pub persist: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            ttl_secs: DEFAULT_TTL_SECS,
            max_size: DEFAULT_MAX_SIZE,
            persist: true,
        }
    }
}

impl RegistryConfig {
    /// A registry that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            persist: false,
            ..Default::default()
        }
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs();
        self
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// `agents.json` → `agents.access.json`
    pub fn access_path(&self) -> PathBuf {
        let stem = self
            .cache_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("agents");
        self.cache_path.with_file_name(format!("{}.access.json", stem))
    }

    pub fn validate(&self) -> RegistryResult<()> {
        if self.max_size == 0 {
            return Err(RegistryError::InvalidConfig("max_size must be at least 1".into()));
        }
        if self.persist && self.cache_path.file_name().is_none() {
            return Err(RegistryError::InvalidConfig(format!(
                "cache_path '{}' does not name a file",
                self.cache_path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_path_is_sibling() {
        let config = RegistryConfig::default().with_cache_path("/tmp/x/agents.json");
        assert_eq!(config.access_path(), PathBuf::from("/tmp/x/agents.access.json"));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(RegistryConfig::default().with_max_size(0).validate().is_err());
        assert!(RegistryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_ttl_round_trip() {
        let config = RegistryConfig::default().with_ttl(Duration::from_secs(90));
        assert_eq!(config.ttl_secs, 90);
        assert_eq!(config.ttl(), Duration::from_secs(90));
    }
}
