//! Shared test doubles for the playback integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_desktop::TokioFileSystem;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    BridgeError, DynAsyncRead, HttpClient, HttpRequest, MediaEvent, MediaEventKind,
    MediaEventSender, MediaPlayer, MediaSessionId,
};
use core_playback::{
    CacheConfig, EngineConfig, LocalCacheStore, PlaybackEngine, PlaybackListener, PlaybackState,
    PlayerState, TrackMetadata,
};
use mockall::mock;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;

// ============================================================================
// Media player
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Attach(PathBuf),
    Detach,
    Play,
    Pause,
    Seek(Duration),
}

#[derive(Default)]
struct FakePlayerState {
    session: Option<MediaSessionId>,
    calls: Vec<PlayerCall>,
    position: Duration,
    duration: Option<Duration>,
    fail_attach: bool,
}

/// In-memory media player recording every call.
#[derive(Default)]
pub struct FakeMediaPlayer {
    events: MediaEventSender,
    state: Mutex<FakePlayerState>,
}

impl FakeMediaPlayer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.state.lock().calls.clone()
    }

    pub fn attached_paths(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlayerCall::Attach(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &PlayerCall) -> usize {
        self.state.lock().calls.iter().filter(|c| *c == call).count()
    }

    pub fn session(&self) -> Option<MediaSessionId> {
        self.state.lock().session
    }

    pub fn set_position(&self, position: Duration) {
        self.state.lock().position = position;
    }

    pub fn position_now(&self) -> Duration {
        self.state.lock().position
    }

    pub fn set_duration(&self, duration: Option<Duration>) {
        self.state.lock().duration = duration;
    }

    pub fn fail_attach(&self, fail: bool) {
        self.state.lock().fail_attach = fail;
    }

    /// Emit a status event for the current session.
    pub fn emit(&self, kind: MediaEventKind) {
        if let Some(session) = self.session() {
            self.events.emit(session, kind);
        }
    }

    pub fn emit_for(&self, session: MediaSessionId, kind: MediaEventKind) {
        self.events.emit(session, kind);
    }
}

#[async_trait]
impl MediaPlayer for FakeMediaPlayer {
    async fn attach(&self, path: &Path) -> BridgeResult<MediaSessionId> {
        let mut state = self.state.lock();
        state.calls.push(PlayerCall::Attach(path.to_path_buf()));
        if state.fail_attach {
            return Err(BridgeError::Media("unsupported format".to_string()));
        }

        let session = MediaSessionId::new();
        state.session = Some(session);
        state.position = Duration::ZERO;
        Ok(session)
    }

    async fn detach(&self) -> BridgeResult<()> {
        let mut state = self.state.lock();
        state.calls.push(PlayerCall::Detach);
        state.session = None;
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.state.lock().calls.push(PlayerCall::Play);
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.state.lock().calls.push(PlayerCall::Pause);
        Ok(())
    }

    async fn seek(&self, position: Duration) -> BridgeResult<()> {
        let mut state = self.state.lock();
        state.calls.push(PlayerCall::Seek(position));
        state.position = position;
        Ok(())
    }

    async fn position(&self) -> BridgeResult<Option<Duration>> {
        let state = self.state.lock();
        Ok(state.session.map(|_| state.position))
    }

    async fn duration(&self) -> BridgeResult<Option<Duration>> {
        let state = self.state.lock();
        Ok(state.session.and(state.duration))
    }

    fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.events.subscribe()
    }
}

// ============================================================================
// HTTP
// ============================================================================

mock! {
    pub Http {}

    #[async_trait]
    impl HttpClient for Http {
        async fn download_stream(&self, request: HttpRequest) -> BridgeResult<Box<DynAsyncRead>>;
    }
}

pub fn body(bytes: &[u8]) -> Box<DynAsyncRead> {
    Box::new(Cursor::new(bytes.to_vec()))
}

/// HTTP client serving fixed bodies, optionally after a delay.
#[derive(Default)]
pub struct FakeHttpClient {
    routes: Mutex<HashMap<String, (Vec<u8>, Duration)>>,
    fetches: AtomicUsize,
}

impl FakeHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, url: &str, body: &[u8]) {
        self.route_delayed(url, body, Duration::ZERO);
    }

    pub fn route_delayed(&self, url: &str, body: &[u8], delay: Duration) {
        self.routes
            .lock()
            .insert(url.to_string(), (body.to_vec(), delay));
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for FakeHttpClient {
    async fn download_stream(&self, request: HttpRequest) -> BridgeResult<Box<DynAsyncRead>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let route = self.routes.lock().get(&request.url).cloned();

        match route {
            Some((bytes, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(body(&bytes))
            }
            None => Err(BridgeError::HttpStatus {
                status: 404,
                url: request.url,
            }),
        }
    }
}

// ============================================================================
// Listener
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Player(PlayerState),
    Playback(PlaybackState),
    Track(Option<String>),
    Metadata(TrackMetadata),
    Finished(Option<String>),
}

#[derive(Default)]
pub struct RecordingListener {
    log: Mutex<Vec<Notification>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<Notification> {
        self.log.lock().clone()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }

    pub fn player_states(&self) -> Vec<PlayerState> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Player(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn playback_states(&self) -> Vec<PlaybackState> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Playback(state) => Some(state),
                _ => None,
            })
            .collect()
    }
}

impl PlaybackListener for RecordingListener {
    fn on_player_state_changed(&self, state: PlayerState) {
        self.log.lock().push(Notification::Player(state));
    }

    fn on_playback_state_changed(&self, state: PlaybackState) {
        self.log.lock().push(Notification::Playback(state));
    }

    fn on_track_changed(&self, url: Option<&str>) {
        self.log
            .lock()
            .push(Notification::Track(url.map(str::to_string)));
    }

    fn on_metadata_changed(&self, metadata: &TrackMetadata) {
        self.log.lock().push(Notification::Metadata(metadata.clone()));
    }

    fn on_playback_finished(&self, url: Option<&str>) {
        self.log
            .lock()
            .push(Notification::Finished(url.map(str::to_string)));
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub engine: PlaybackEngine,
    pub player: Arc<FakeMediaPlayer>,
    pub listener: Arc<RecordingListener>,
    pub cache: Arc<LocalCacheStore>,
    pub dir: TempDir,
}

pub fn cache_store(dir: &TempDir, http: Arc<dyn HttpClient>) -> Arc<LocalCacheStore> {
    let config = CacheConfig::new().with_cache_directory(dir.path().join("tracks"));
    Arc::new(
        LocalCacheStore::new(config, http, Arc::new(TokioFileSystem::new()))
            .expect("valid cache config"),
    )
}

pub fn harness(http: Arc<dyn HttpClient>) -> Harness {
    harness_with(EngineConfig::default(), http)
}

pub fn harness_with(config: EngineConfig, http: Arc<dyn HttpClient>) -> Harness {
    let dir = TempDir::new().expect("temp dir");
    let cache = cache_store(&dir, http);
    let player = FakeMediaPlayer::new();
    let engine = PlaybackEngine::new(config, player.clone(), cache.clone(), None)
        .expect("engine");
    let listener = RecordingListener::new();
    engine.add_listener(listener.clone());

    Harness {
        engine,
        player,
        listener,
        cache,
        dir,
    }
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
