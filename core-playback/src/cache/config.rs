//! Cache configuration and key policy

use super::key::CacheKeyStrategy;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the local track cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Absolute directory for cached tracks. `None` places them under the
    /// host's cache directory, in `subdirectory`.
    pub cache_directory: Option<PathBuf>,

    /// Folder name used inside the host cache directory (default: "tracks")
    pub subdirectory: String,

    /// How remote URLs map to cache file names
    pub key_strategy: CacheKeyStrategy,

    /// Upper bound for a single download. `None` waits as long as the
    /// transport does.
    pub download_timeout: Option<Duration>,

    /// Buffer size used when copying the response body to disk (default: 64 KiB)
    pub copy_buffer_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_directory: None,
            subdirectory: "tracks".to_string(),
            key_strategy: CacheKeyStrategy::default(),
            download_timeout: None,
            copy_buffer_bytes: 64 * 1024,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store tracks directly in `dir`.
    pub fn with_cache_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_directory = Some(dir.into());
        self
    }

    /// Set the folder name used inside the host cache directory.
    pub fn with_subdirectory(mut self, name: impl Into<String>) -> Self {
        self.subdirectory = name.into();
        self
    }

    /// Set the cache key strategy.
    pub fn with_key_strategy(mut self, strategy: CacheKeyStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    /// Set download timeout.
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = Some(timeout);
        self
    }

    /// Set the copy buffer size.
    pub fn with_copy_buffer_bytes(mut self, bytes: usize) -> Self {
        self.copy_buffer_bytes = bytes;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(dir) = &self.cache_directory {
            if dir.as_os_str().is_empty() {
                return Err("cache_directory cannot be empty".to_string());
            }
        } else if self.subdirectory.is_empty() {
            return Err("subdirectory cannot be empty".to_string());
        }

        if self.download_timeout.is_some_and(|t| t.is_zero()) {
            return Err("download_timeout must be greater than 0".to_string());
        }

        if self.copy_buffer_bytes == 0 {
            return Err("copy_buffer_bytes must be greater than 0".to_string());
        }

        Ok(())
    }
}
