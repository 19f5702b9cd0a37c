//! # Local Cache Store
//!
//! Resolves remote track URLs to local files, downloading each URL at most
//! once and reusing the cached copy afterwards.
//!
//! Downloads stream into a uniquely named `.part` file next to the target and
//! are moved into place with a single rename, so a cache file is either
//! absent or complete. Entries are never evicted or verified.

use crate::cache::{
    config::CacheConfig,
    stats::{CacheCounters, CacheStats},
};
use crate::error::{PlaybackError, Result};
use crate::events::{CacheEvent, EngineEvent};
use bridge_traits::{FileSystemAccess, HttpClient, HttpRequest};
use core_runtime::events::EventBus;
use core_runtime::logging::strip_path;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Result of [`LocalCacheStore::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    /// Local file holding the complete track.
    pub path: PathBuf,
    /// Whether the file already existed before this call.
    pub cache_hit: bool,
}

/// URL-to-local-file cache backed by the host's HTTP and filesystem bridges.
pub struct LocalCacheStore {
    config: CacheConfig,
    http_client: Arc<dyn HttpClient>,
    fs: Arc<dyn FileSystemAccess>,
    event_bus: Option<EventBus<EngineEvent>>,
    counters: CacheCounters,
    cache_dir: OnceCell<PathBuf>,
}

impl LocalCacheStore {
    /// Create a new cache store.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Config` if `config` fails validation.
    pub fn new(
        config: CacheConfig,
        http_client: Arc<dyn HttpClient>,
        fs: Arc<dyn FileSystemAccess>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PlaybackError::Config(format!("Invalid cache configuration: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            fs,
            event_bus: None,
            counters: CacheCounters::default(),
            cache_dir: OnceCell::new(),
        })
    }

    /// Set event bus for cache events.
    pub fn with_event_bus(mut self, event_bus: EventBus<EngineEvent>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Snapshot of hit/miss/download counters.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Directory holding cached tracks, created on first use.
    pub async fn cache_directory(&self) -> Result<PathBuf> {
        let dir = self
            .cache_dir
            .get_or_try_init(|| async {
                let dir = match &self.config.cache_directory {
                    Some(dir) => dir.clone(),
                    None => self
                        .fs
                        .get_cache_directory()
                        .await
                        .map_err(|e| {
                            PlaybackError::CacheWriteFailed(format!(
                                "Failed to get cache directory: {}",
                                e
                            ))
                        })?
                        .join(&self.config.subdirectory),
                };

                self.fs.create_dir_all(&dir).await.map_err(|e| {
                    PlaybackError::CacheWriteFailed(format!(
                        "Failed to create cache directory: {}",
                        e
                    ))
                })?;

                debug!(path = ?dir, "Cache directory ready");
                Ok::<_, PlaybackError>(dir)
            })
            .await?;

        Ok(dir.clone())
    }

    /// Local path `url` maps to, whether or not it is cached yet.
    pub async fn path_for(&self, url: &str) -> Result<PathBuf> {
        let file_name = self.config.key_strategy.file_name(url)?;
        Ok(self.cache_directory().await?.join(file_name))
    }

    /// Check whether `url` already has a complete local copy.
    pub async fn is_cached(&self, url: &str) -> Result<bool> {
        let path = self.path_for(url).await?;
        self.fs.exists(&path).await.map_err(PlaybackError::from)
    }

    /// Resolve `url` to a local file, downloading it on a cache miss.
    ///
    /// # Errors
    ///
    /// - `InvalidUrl` if no cache key can be derived from `url`
    /// - `CacheFetchFailed` on network errors, HTTP errors or timeout
    /// - `CacheWriteFailed` if the file cannot be written or moved into place
    #[instrument(skip(self, url), fields(file = %strip_path(url)))]
    pub async fn resolve(&self, url: &str) -> Result<ResolvedTrack> {
        let path = self.path_for(url).await?;

        if self.fs.exists(&path).await? {
            debug!("Cache hit");
            self.counters.record_hit();
            self.emit(CacheEvent::Hit {
                url: url.to_string(),
                path: path.clone(),
            });
            return Ok(ResolvedTrack {
                path,
                cache_hit: true,
            });
        }

        self.counters.record_miss();
        self.emit(CacheEvent::DownloadStarted {
            url: url.to_string(),
        });

        match self.download(url, &path).await {
            Ok(bytes) => {
                info!(bytes, "Track cached");
                self.counters.record_download(bytes);
                self.emit(CacheEvent::DownloadCompleted {
                    url: url.to_string(),
                    path: path.clone(),
                    bytes,
                });
                Ok(ResolvedTrack {
                    path,
                    cache_hit: false,
                })
            }
            Err(e) => {
                warn!(error = %e, "Track download failed");
                self.counters.record_failure();
                self.emit(CacheEvent::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Stream `url` into a temporary file, then rename it onto `target`.
    async fn download(&self, url: &str, target: &Path) -> Result<u64> {
        let partial = partial_path(target);

        let fetched = match self.config.download_timeout {
            Some(limit) => tokio::time::timeout(limit, self.download_to(url, &partial))
                .await
                .unwrap_or_else(|_| {
                    Err(PlaybackError::CacheFetchFailed {
                        url: url.to_string(),
                        reason: format!("Download timed out after {:?}", limit),
                    })
                }),
            None => self.download_to(url, &partial).await,
        };

        match fetched {
            Ok(bytes) => {
                self.fs.rename(&partial, target).await.map_err(|e| {
                    PlaybackError::CacheWriteFailed(format!(
                        "Failed to move {} into place: {}",
                        strip_path(&target.to_string_lossy()),
                        e
                    ))
                })?;
                Ok(bytes)
            }
            Err(e) => {
                self.discard_partial(&partial).await;
                Err(e)
            }
        }
    }

    async fn download_to(&self, url: &str, partial: &Path) -> Result<u64> {
        let fetch_failed = |reason: String| PlaybackError::CacheFetchFailed {
            url: url.to_string(),
            reason,
        };

        let mut reader = self
            .http_client
            .download_stream(HttpRequest::get(url))
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;

        let mut writer = self.fs.open_write_stream(partial).await.map_err(|e| {
            PlaybackError::CacheWriteFailed(format!("Failed to open temporary file: {}", e))
        })?;

        let mut buffer = vec![0u8; self.config.copy_buffer_bytes];
        let mut total: u64 = 0;

        loop {
            let read = reader
                .read(&mut buffer)
                .await
                .map_err(|e| fetch_failed(e.to_string()))?;
            if read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..read])
                .await
                .map_err(|e| PlaybackError::CacheWriteFailed(e.to_string()))?;
            total += read as u64;
        }

        writer
            .shutdown()
            .await
            .map_err(|e| PlaybackError::CacheWriteFailed(e.to_string()))?;

        debug!(bytes = total, "Download written");
        Ok(total)
    }

    async fn discard_partial(&self, partial: &Path) {
        match self.fs.exists(partial).await {
            Ok(true) => {
                if let Err(e) = self.fs.delete_file(partial).await {
                    warn!(error = %e, "Failed to remove partial download");
                }
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Failed to check partial download"),
        }
    }

    fn emit(&self, event: CacheEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(event.into()).ok();
        }
    }
}

/// Unique sibling path for an in-progress download of `target`.
fn partial_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{}.{}.part", name, Uuid::new_v4().simple()))
}
