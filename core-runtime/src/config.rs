//! # Core Configuration Module
//!
//! Provides configuration management for the playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the bridge implementations and settings the core needs.
//! It enforces fail-fast validation so missing bridges are reported before
//! any engine is created.
//!
//! ## Required Dependencies
//!
//! - `MediaPlayer` - Always injected by the host; the core ships no audio output
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - Track downloads (desktop default: reqwest)
//! - `FileSystemAccess` - Cache directory and file I/O (desktop default: tokio fs)
//!
//! When the `desktop-shims` feature is enabled, the desktop defaults are
//! injected automatically if not provided. Without it, every bridge is required.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .media_player(Arc::new(MyPlayer::new()))
//!     .cache_dir("/path/to/cache")
//!     .auto_advance(true)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{FileSystemAccess, HttpClient, MediaPlayer};
use std::path::PathBuf;
use std::sync::Arc;

/// Default buffer size for the engine event bus.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = crate::events::DEFAULT_EVENT_BUFFER_SIZE;

/// Core configuration for the playback core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Directory for cached tracks. `None` uses the file system's cache directory.
    pub cache_dir: Option<PathBuf>,

    /// HTTP client used to download tracks
    pub http_client: Arc<dyn HttpClient>,

    /// File system access abstraction
    pub file_system: Arc<dyn FileSystemAccess>,

    /// Host media player (required)
    pub media_player: Arc<dyn MediaPlayer>,

    /// Feature flags
    pub features: FeatureFlags,

    /// Capacity of the engine event bus channel
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("cache_dir", &self.cache_dir)
            .field("http_client", &"HttpClient { ... }")
            .field("file_system", &"FileSystemAccess { ... }")
            .field("media_player", &"MediaPlayer { ... }")
            .field("features", &self.features)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

/// Feature flags control optional functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Advance to the next track when the current one plays to the end
    pub auto_advance: bool,

    /// Publish engine and cache notifications on a broadcast event bus
    pub event_bus: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            auto_advance: true,
            event_bus: true,
        }
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Cache directory, when given, is not empty
    /// - Event buffer size is greater than zero
    pub fn validate(&self) -> Result<()> {
        if let Some(cache_dir) = &self.cache_dir {
            if cache_dir.as_os_str().is_empty() {
                return Err(Error::Config("Cache directory cannot be empty".to_string()));
            }
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn media_player_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaPlayer".to_string(),
        message: "MediaPlayer implementation is required for audio output. \
                 Inject the host's native player (AVPlayer, ExoPlayer or a desktop \
                 audio backend) through .media_player()."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to download tracks. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient. \
                 Mobile: inject a platform-native HTTP client (URLSession/OkHttp)."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system(cache_dir: Option<&PathBuf>) -> Result<Arc<dyn FileSystemAccess>> {
    use bridge_desktop::TokioFileSystem;

    let fs = match cache_dir {
        Some(dir) => TokioFileSystem::with_cache_directory(dir.clone()),
        None => TokioFileSystem::new(),
    };
    let fs: Arc<dyn FileSystemAccess> = Arc::new(fs);
    Ok(fs)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system(_cache_dir: Option<&PathBuf>) -> Result<Arc<dyn FileSystemAccess>> {
    Err(Error::CapabilityMissing {
        capability: "FileSystemAccess".to_string(),
        message: "FileSystemAccess implementation is required for the track cache. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default TokioFileSystem. \
                 Mobile: inject sandboxed app-directory access."
            .to_string(),
    })
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) once all bridges are set; it
/// returns an actionable error for each missing capability.
#[derive(Default)]
pub struct CoreConfigBuilder {
    cache_dir: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    media_player: Option<Arc<dyn MediaPlayer>>,
    features: FeatureFlags,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the directory used for cached tracks.
    pub fn cache_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    /// Sets the HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the file system access implementation.
    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Sets the media player implementation (required).
    pub fn media_player(mut self, player: Arc<dyn MediaPlayer>) -> Self {
        self.media_player = Some(player);
        self
    }

    /// Enables or disables advancing to the next track at end of playback.
    pub fn auto_advance(mut self, enabled: bool) -> Self {
        self.features.auto_advance = enabled;
        self
    }

    /// Enables or disables the broadcast event bus.
    pub fn enable_event_bus(mut self, enabled: bool) -> Self {
        self.features.event_bus = enabled;
        self
    }

    /// Replaces all feature flags at once.
    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Sets the capacity of the event bus channel.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` when the media player is absent, or when the HTTP
    ///   client or file system is absent without `desktop-shims`
    /// - `Config` when a value fails validation
    pub fn build(self) -> Result<CoreConfig> {
        let media_player = self.media_player.ok_or_else(media_player_missing_error)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system(self.cache_dir.as_ref())?,
        };

        let config = CoreConfig {
            cache_dir: self.cache_dir,
            http_client,
            file_system,
            media_player,
            features: self.features,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
