//! # Playback Engine
//!
//! Owns the host media player, the current track and the two state machines
//! observers see: [`PlayerState`] (readiness) and [`PlaybackState`] (activity).
//!
//! ## Overview
//!
//! - `set_track` tears down the current session, resolves the new URL through
//!   the [`LocalCacheStore`] on a background task and attaches the local file
//!   to a fresh media session
//! - Transport calls (`play`, `pause`, `stop`, seeking) act on the attached
//!   session and are no-ops without one
//! - Status events from the media player are consumed by a pump task and
//!   mapped onto [`PlayerState`]
//! - Every real state transition is delivered to registered
//!   [`PlaybackListener`]s and, when configured, published on the event bus
//!
//! ## Concurrency
//!
//! All state lives behind one async mutex. Load completions and media events
//! are applied under that lock, so observers never see interleaved updates.
//! Each `set_track` bumps a generation counter; a load whose generation is no
//! longer current is discarded instead of attaching a stale file.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_playback::{EngineConfig, PlaybackEngine};
//!
//! let engine = PlaybackEngine::new(EngineConfig::default(), player, cache, None)?;
//! engine.add_listener(ui_listener);
//!
//! if let Some(load) = engine.set_track(Some("https://host/a.mp3".into())).await {
//!     load.wait().await;
//! }
//! engine.seek_forward().await;
//! ```

use crate::cache::LocalCacheStore;
use crate::config::EngineConfig;
use crate::error::{PlaybackError, Result};
use crate::events::{EngineEvent, PlaybackEvent, TrackMetadata};
use crate::listener::{ListenerId, ListenerRegistry, PlaybackListener};
use crate::state::{PlaybackState, PlayerState};
use bridge_traits::{MediaEvent, MediaEventKind, MediaPlayer, MediaSessionId};
use core_runtime::events::EventBus;
use parking_lot::Mutex as SyncMutex;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

/// How a load started by [`PlaybackEngine::set_track`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The track was attached to a fresh media session.
    Attached,
    /// Resolving or attaching failed; the player state is `Error`.
    Failed,
    /// A newer `set_track` or a reset replaced this load before it finished.
    Superseded,
}

/// Handle to the background load of a track.
///
/// Dropping the handle does not cancel the load.
#[derive(Debug)]
pub struct LoadHandle {
    generation: u64,
    task: JoinHandle<LoadOutcome>,
}

impl LoadHandle {
    /// Generation this load was started for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the load to finish.
    pub async fn wait(self) -> LoadOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, generation = self.generation, "Load task did not complete");
                LoadOutcome::Failed
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SeekTarget {
    Forward(Duration),
    Backward(Duration),
    Absolute(Duration),
}

#[derive(Debug, Default)]
struct EngineState {
    /// URL most recently passed to `set_track`.
    track_url: Option<String>,
    /// Local file of the current track once resolved.
    loaded_path: Option<PathBuf>,
    /// Live media session, at most one.
    session: Option<MediaSessionId>,
    player_state: PlayerState,
    playback_state: PlaybackState,
    generation: u64,
}

struct EngineInner {
    config: EngineConfig,
    player: Arc<dyn MediaPlayer>,
    cache: Arc<LocalCacheStore>,
    listeners: ListenerRegistry,
    event_bus: Option<EventBus<EngineEvent>>,
    state: Mutex<EngineState>,
    pump: SyncMutex<Option<JoinHandle<()>>>,
}

/// Playback controller wrapping one host media player.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct PlaybackEngine {
    inner: Arc<EngineInner>,
}

impl PlaybackEngine {
    /// Create an engine driving `player`, resolving tracks through `cache`.
    ///
    /// Must be called from within a Tokio runtime: the engine spawns a task
    /// consuming the player's status events.
    ///
    /// # Errors
    ///
    /// - `Config` if `config` fails validation
    /// - `Internal` when called outside a Tokio runtime
    pub fn new(
        config: EngineConfig,
        player: Arc<dyn MediaPlayer>,
        cache: Arc<LocalCacheStore>,
        event_bus: Option<EventBus<EngineEvent>>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PlaybackError::Config(format!("Invalid engine configuration: {}", e)))?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            PlaybackError::Internal(format!("Playback engine needs a Tokio runtime: {}", e))
        })?;

        // Subscribe before anything can be attached so no status is missed.
        let events = player.subscribe();

        let inner = Arc::new(EngineInner {
            config,
            player,
            cache,
            listeners: ListenerRegistry::new(),
            event_bus,
            state: Mutex::new(EngineState::default()),
            pump: SyncMutex::new(None),
        });

        let pump = runtime.spawn(run_event_pump(Arc::downgrade(&inner), events));
        *inner.pump.lock() = Some(pump);

        debug!("Playback engine created");
        Ok(Self { inner })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &Arc<LocalCacheStore> {
        &self.inner.cache
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Register a listener. Listeners are called in registration order.
    pub fn add_listener(&self, listener: Arc<dyn PlaybackListener>) -> ListenerId {
        self.inner.listeners.register(listener)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.unregister(id)
    }

    /// Subscribe to engine events on the bus, if one was configured.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<EngineEvent>> {
        self.inner.event_bus.as_ref().map(EventBus::subscribe)
    }

    // ========================================================================
    // Track
    // ========================================================================

    /// Replace the current track.
    ///
    /// Tears down the current session, then either rests at
    /// [`PlayerState::UrlNotSet`] (`None`) or moves to
    /// [`PlayerState::Loading`] and resolves `url` in the background. The
    /// returned handle resolves once the track is attached, has failed, or
    /// was superseded.
    #[instrument(skip(self, url), fields(has_url = url.is_some()))]
    pub async fn set_track(&self, url: Option<String>) -> Option<LoadHandle> {
        let mut state = self.inner.state.lock().await;
        state.generation += 1;
        let generation = state.generation;

        self.inner.stop_locked(&mut state).await;
        state.loaded_path = None;
        state.track_url = url.clone();

        let Some(url) = url else {
            self.inner
                .set_player_state(&mut state, PlayerState::UrlNotSet);
            return None;
        };

        self.inner.set_player_state(&mut state, PlayerState::Loading);
        drop(state);

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move { inner.complete_load(generation, url).await });

        Some(LoadHandle { generation, task })
    }

    /// Full teardown: stop, forget the track and rest at `UrlNotSet`.
    ///
    /// Any load still in flight is discarded when it completes.
    pub async fn reset_player(&self) {
        let mut state = self.inner.state.lock().await;
        state.generation += 1;

        self.inner.stop_locked(&mut state).await;
        state.loaded_path = None;
        state.track_url = None;
        self.inner
            .set_player_state(&mut state, PlayerState::UrlNotSet);

        info!("Player reset");
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Start or resume playback of the current track.
    ///
    /// No-op until a track has been attached. After `stop` the track's file
    /// is attached again.
    pub async fn play(&self) {
        let mut state = self.inner.state.lock().await;
        self.inner.play_locked(&mut state).await;
    }

    /// Pause playback. No-op without a session.
    pub async fn pause(&self) {
        let mut state = self.inner.state.lock().await;
        self.inner.pause_locked(&mut state).await;
    }

    /// Detach the current session and move to `Stopped`.
    pub async fn stop(&self) {
        let mut state = self.inner.state.lock().await;
        self.inner.stop_locked(&mut state).await;
    }

    /// `pause` when playing, `play` otherwise.
    pub async fn toggle_playing(&self) {
        let mut state = self.inner.state.lock().await;
        if state.playback_state.is_playing() {
            self.inner.pause_locked(&mut state).await;
        } else {
            self.inner.play_locked(&mut state).await;
        }
    }

    /// Seek forward by the configured step, then play.
    pub async fn seek_forward(&self) {
        self.seek_forward_by(self.inner.config.seek_step).await;
    }

    /// Seek backward by the configured step, then play.
    pub async fn seek_backward(&self) {
        self.seek_backward_by(self.inner.config.seek_step).await;
    }

    /// Seek forward by `step`, stopping short of the end of the track.
    pub async fn seek_forward_by(&self, step: Duration) {
        self.seek(SeekTarget::Forward(step)).await;
    }

    /// Seek backward by `step`, never before the start of the track.
    pub async fn seek_backward_by(&self, step: Duration) {
        self.seek(SeekTarget::Backward(step)).await;
    }

    /// Seek to an absolute position, clamped like a forward seek.
    pub async fn seek_to(&self, position: Duration) {
        self.seek(SeekTarget::Absolute(position)).await;
    }

    async fn seek(&self, target: SeekTarget) {
        let mut state = self.inner.state.lock().await;
        if state.session.is_none() {
            debug!(?target, "Seek ignored without a session");
            return;
        }

        self.inner.seek_locked(target).await;
        self.inner.play_locked(&mut state).await;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Current playback position, `None` without a session.
    pub async fn current_time(&self) -> Option<Duration> {
        let state = self.inner.state.lock().await;
        if state.session.is_none() {
            return None;
        }

        self.inner
            .player
            .position()
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read playback position");
                None
            })
    }

    /// Total duration of the current track, `None` without a session or
    /// while unknown.
    pub async fn duration(&self) -> Option<Duration> {
        let state = self.inner.state.lock().await;
        if state.session.is_none() {
            return None;
        }

        self.inner
            .player
            .duration()
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read track duration");
                None
            })
    }

    pub async fn player_state(&self) -> PlayerState {
        self.inner.state.lock().await.player_state
    }

    pub async fn playback_state(&self) -> PlaybackState {
        self.inner.state.lock().await.playback_state
    }

    pub async fn is_playing(&self) -> bool {
        self.playback_state().await.is_playing()
    }

    /// URL most recently set, including one that is still loading.
    pub async fn current_url(&self) -> Option<String> {
        self.inner.state.lock().await.track_url.clone()
    }

    /// Whether a track is set, loaded or not.
    pub async fn has_track(&self) -> bool {
        self.inner.state.lock().await.track_url.is_some()
    }

    /// Whether the current track has finished resolving into a local file.
    pub async fn is_loaded(&self) -> bool {
        self.inner.state.lock().await.loaded_path.is_some()
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("config", &self.inner.config)
            .field("listeners", &self.inner.listeners)
            .finish_non_exhaustive()
    }
}

impl EngineInner {
    async fn complete_load(self: Arc<Self>, generation: u64, url: String) -> LoadOutcome {
        let resolved = self.cache.resolve(&url).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(generation, current = state.generation, "Discarding stale load");
            return LoadOutcome::Superseded;
        }

        let path = match resolved {
            Ok(resolved) => resolved.path,
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Failed to resolve track");
                self.set_player_state(&mut state, PlayerState::Error);
                return LoadOutcome::Failed;
            }
        };

        let session = match self.player.attach(&path).await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Media player rejected track");
                self.set_player_state(&mut state, PlayerState::Error);
                return LoadOutcome::Failed;
            }
        };

        debug!(%session, "Track attached");
        state.session = Some(session);
        state.loaded_path = Some(path);

        self.set_player_state(&mut state, PlayerState::ReadyToPlay);
        self.notify(PlaybackEvent::TrackChanged { url: Some(url) });

        if self.config.auto_play {
            self.play_locked(&mut state).await;
        }

        LoadOutcome::Attached
    }

    async fn play_locked(&self, state: &mut EngineState) {
        let Some(path) = state.loaded_path.clone() else {
            debug!("Play ignored without a track");
            return;
        };

        if state.session.is_none() {
            match self.player.attach(&path).await {
                Ok(session) => {
                    debug!(%session, "Track attached again");
                    state.session = Some(session);
                }
                Err(e) => {
                    warn!(error = %e, "Media player rejected track");
                    self.set_player_state(state, PlayerState::Error);
                    return;
                }
            }
        }

        if let Err(e) = self.player.play().await {
            warn!(error = %e, "Failed to start playback");
            self.set_player_state(state, PlayerState::Error);
            return;
        }

        self.set_playback_state(state, PlaybackState::Playing);
    }

    async fn pause_locked(&self, state: &mut EngineState) {
        if state.session.is_none() {
            debug!("Pause ignored without a session");
            return;
        }

        if let Err(e) = self.player.pause().await {
            warn!(error = %e, "Failed to pause playback");
            return;
        }

        self.set_playback_state(state, PlaybackState::Paused);
    }

    async fn stop_locked(&self, state: &mut EngineState) {
        if let Some(session) = state.session.take() {
            if let Err(e) = self.player.detach().await {
                warn!(error = %e, %session, "Failed to detach media session");
            }
        }

        self.set_playback_state(state, PlaybackState::Stopped);
    }

    async fn seek_locked(&self, target: SeekTarget) {
        let position = match target {
            SeekTarget::Forward(step) => {
                let (Some(position), Some(limit)) = (self.position().await, self.seek_limit().await)
                else {
                    return;
                };
                let target = position.saturating_add(step).min(limit);
                if target <= position {
                    trace!(?position, ?limit, "Already inside the end margin");
                    return;
                }
                target
            }
            SeekTarget::Backward(step) => match self.position().await {
                Some(position) => position.saturating_sub(step),
                None => return,
            },
            SeekTarget::Absolute(to) => match self.seek_limit().await {
                Some(limit) => to.min(limit),
                None => return,
            },
        };

        trace!(?position, "Seeking");
        if let Err(e) = self.player.seek(position).await {
            warn!(error = %e, "Seek failed");
        }
    }

    async fn position(&self) -> Option<Duration> {
        match self.player.position().await {
            Ok(position) => Some(position.unwrap_or_default()),
            Err(e) => {
                warn!(error = %e, "Failed to read playback position");
                None
            }
        }
    }

    /// Furthest position a forward seek may reach, `None` while the
    /// duration is unknown.
    async fn seek_limit(&self) -> Option<Duration> {
        match self.player.duration().await {
            Ok(Some(duration)) => Some(duration.saturating_sub(self.config.seek_end_margin)),
            Ok(None) => {
                debug!("Seek skipped while duration is unknown");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read track duration");
                None
            }
        }
    }

    async fn handle_media_event(&self, event: MediaEvent) {
        let mut state = self.state.lock().await;
        if state.session != Some(event.session) {
            trace!(session = %event.session, "Ignoring event for inactive session");
            return;
        }

        match event.kind {
            MediaEventKind::Ready => self.set_player_state(&mut state, PlayerState::ReadyToPlay),
            MediaEventKind::Failed { message } => {
                warn!(%message, "Media session failed");
                self.set_player_state(&mut state, PlayerState::Error);
            }
            MediaEventKind::BufferEmpty => {
                self.set_player_state(&mut state, PlayerState::Loading)
            }
            MediaEventKind::LikelyToKeepUp(true) => {
                self.set_player_state(&mut state, PlayerState::LoadingFinished)
            }
            MediaEventKind::LikelyToKeepUp(false) => {
                self.set_player_state(&mut state, PlayerState::Loading)
            }
            MediaEventKind::TimedMetadata(raw) => {
                self.notify(PlaybackEvent::MetadataChanged {
                    metadata: TrackMetadata::parse(raw),
                });
            }
            MediaEventKind::PlayedToEnd => {
                // The player halts at the end on its own.
                self.set_playback_state(&mut state, PlaybackState::Paused);
                self.notify(PlaybackEvent::PlaybackFinished {
                    url: state.track_url.clone(),
                });
            }
        }
    }

    fn set_player_state(&self, state: &mut EngineState, new: PlayerState) {
        if state.player_state == new {
            return;
        }

        debug!(from = ?state.player_state, to = ?new, "Player state changed");
        state.player_state = new;
        self.notify(PlaybackEvent::PlayerStateChanged { state: new });
    }

    fn set_playback_state(&self, state: &mut EngineState, new: PlaybackState) {
        if state.playback_state == new {
            return;
        }

        debug!(from = ?state.playback_state, to = ?new, "Playback state changed");
        state.playback_state = new;
        self.notify(PlaybackEvent::PlaybackStateChanged { state: new });
    }

    fn notify(&self, event: PlaybackEvent) {
        let event = EngineEvent::from(event);
        self.listeners.dispatch(&event);
        if let Some(bus) = &self.event_bus {
            bus.emit(event).ok();
        }
    }
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.get_mut().take() {
            pump.abort();
        }
    }
}

async fn run_event_pump(engine: Weak<EngineInner>, mut events: broadcast::Receiver<MediaEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let Some(engine) = engine.upgrade() else {
                    break;
                };
                engine.handle_media_event(event).await;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Media event pump lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Media event channel closed");
                break;
            }
        }
    }
}
