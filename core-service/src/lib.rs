//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (media player, HTTP,
//! filesystem) into the playback core and owns the resulting object graph:
//! one event bus, one track cache, one engine, one track selector and the
//! remote command handler. Hosts construct a single [`CoreService`] at
//! startup and hand clones of it to whatever needs playback.
//!
//! Desktop apps typically enable the `desktop-shims` feature, which fills in
//! reqwest and tokio-fs bridges; mobile hosts inject their own.

pub mod error;

pub use error::{CoreError, Result};

use bridge_traits::{FileSystemAccess, HttpClient, MediaPlayer};
use core_playback::{
    CacheConfig, CommandStatus, EngineConfig, EngineEvent, ListenerId, LocalCacheStore,
    NowPlayingInfo, PlaybackEngine, PlaybackListener, RemoteCommand, RemoteCommandHandler, Track,
    TrackSelector,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    config: CoreConfig,
    event_bus: Option<EventBus<EngineEvent>>,
    cache: Arc<LocalCacheStore>,
    engine: PlaybackEngine,
    selector: Arc<TrackSelector>,
    remote: RemoteCommandHandler,
}

impl CoreService {
    /// Create a service with default engine and cache settings.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: CoreConfig) -> Result<Self> {
        Self::with_settings(config, EngineConfig::default(), CacheConfig::default())
    }

    /// Create a service with explicit engine and cache settings.
    ///
    /// `config.cache_dir`, when set, places the cache under that directory
    /// unless `cache` already names one.
    pub fn with_settings(
        config: CoreConfig,
        engine_config: EngineConfig,
        mut cache_config: CacheConfig,
    ) -> Result<Self> {
        config.validate()?;

        let event_bus = config
            .features
            .event_bus
            .then(|| EventBus::new(config.event_buffer_size));

        if cache_config.cache_directory.is_none() {
            if let Some(dir) = &config.cache_dir {
                cache_config.cache_directory = Some(dir.join(&cache_config.subdirectory));
            }
        }

        let mut cache = LocalCacheStore::new(
            cache_config,
            Arc::clone(&config.http_client),
            Arc::clone(&config.file_system),
        )?;
        if let Some(bus) = &event_bus {
            cache = cache.with_event_bus(bus.clone());
        }
        let cache = Arc::new(cache);

        let engine = PlaybackEngine::new(
            engine_config,
            Arc::clone(&config.media_player),
            Arc::clone(&cache),
            event_bus.clone(),
        )?;

        let selector = Arc::new(TrackSelector::new(engine.clone()));
        let remote = RemoteCommandHandler::new(engine.clone(), Arc::clone(&selector));

        if config.features.auto_advance {
            engine.add_listener(Arc::new(AutoAdvance {
                selector: Arc::downgrade(&selector),
            }));
        }

        info!(
            auto_advance = config.features.auto_advance,
            event_bus = event_bus.is_some(),
            "Core service initialized"
        );

        Ok(Self {
            inner: Arc::new(ServiceInner {
                config,
                event_bus,
                cache,
                engine,
                selector,
                remote,
            }),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.inner.config
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.inner.engine
    }

    pub fn selector(&self) -> &Arc<TrackSelector> {
        &self.inner.selector
    }

    pub fn cache(&self) -> &Arc<LocalCacheStore> {
        &self.inner.cache
    }

    pub fn remote(&self) -> &RemoteCommandHandler {
        &self.inner.remote
    }

    /// Subscribe to engine and cache events, if the event bus is enabled.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<EngineEvent>> {
        self.inner.event_bus.as_ref().map(EventBus::subscribe)
    }

    /// Filterable event stream, if the event bus is enabled.
    pub fn events(&self) -> Option<EventStream<EngineEvent>> {
        self.inner.event_bus.as_ref().map(EventBus::stream)
    }

    /// Replace the track list shown to the user.
    pub async fn set_tracks(&self, tracks: Vec<Track>) {
        self.inner.selector.set_tracks(tracks).await;
    }

    /// Handle a command from a remote-control surface.
    pub async fn handle_command(&self, command: RemoteCommand) -> CommandStatus {
        self.inner.remote.handle(command).await
    }

    pub async fn now_playing(&self) -> Option<NowPlayingInfo> {
        self.inner.selector.now_playing().await
    }

    pub fn add_listener(&self, listener: Arc<dyn PlaybackListener>) -> ListenerId {
        self.inner.engine.add_listener(listener)
    }
}

/// Moves to the next track once the current one plays to its end.
struct AutoAdvance {
    selector: Weak<TrackSelector>,
}

impl PlaybackListener for AutoAdvance {
    fn on_playback_finished(&self, url: Option<&str>) {
        let Some(selector) = self.selector.upgrade() else {
            return;
        };

        debug!(finished = url.is_some(), "Advancing to next track");
        // Runs on the engine's event task with its state locked.
        tokio::spawn(async move {
            if let Err(e) = selector.next().await {
                warn!(error = %e, "Auto-advance failed");
            }
        });
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Only the media player has to be supplied; HTTP and filesystem bridges use
/// the reqwest and tokio-fs defaults.
///
/// ```ignore
/// let core = core_service::bootstrap_desktop(Arc::new(MyPlayer::new()))?;
/// core.set_tracks(tracks).await;
/// core.handle_command(RemoteCommand::Next).await;
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(media_player: Arc<dyn MediaPlayer>) -> Result<CoreService> {
    let config = CoreConfig::builder().media_player(media_player).build()?;
    CoreService::new(config)
}

/// Build a service from explicit bridges.
pub fn bootstrap(
    media_player: Arc<dyn MediaPlayer>,
    http_client: Arc<dyn HttpClient>,
    file_system: Arc<dyn FileSystemAccess>,
) -> Result<CoreService> {
    let config = CoreConfig::builder()
        .media_player(media_player)
        .http_client(http_client)
        .file_system(file_system)
        .build()?;
    CoreService::new(config)
}
