//! Media player bridge.
//!
//! The core never decodes audio itself. Hosts wrap their native media engine
//! (AVPlayer, ExoPlayer, a desktop audio backend) behind [`MediaPlayer`] and
//! report status changes as explicit [`MediaEvent`]s instead of exposing
//! observable properties.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::Result;

/// Default capacity of the media event channel.
pub const DEFAULT_MEDIA_EVENT_CAPACITY: usize = 64;

/// Identifier of one attached media session (one local file on the player).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaSessionId(Uuid);

impl MediaSessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MediaSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MediaSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Status signals reported by the underlying player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEventKind {
    /// The attached media can be played.
    Ready,
    /// The player gave up on the attached media.
    Failed { message: String },
    /// The playback buffer ran dry.
    BufferEmpty,
    /// Whether buffered data is expected to keep up with playback.
    LikelyToKeepUp(bool),
    /// Timed metadata embedded in the stream, typically `"Artist - Title"`.
    TimedMetadata(String),
    /// Playback reached the end of the attached media.
    PlayedToEnd,
}

/// A status signal tagged with the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEvent {
    pub session: MediaSessionId,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    pub fn new(session: MediaSessionId, kind: MediaEventKind) -> Self {
        Self { session, kind }
    }
}

/// Sending half of a media event channel, for use by player implementations.
#[derive(Debug, Clone)]
pub struct MediaEventSender {
    sender: broadcast::Sender<MediaEvent>,
}

impl MediaEventSender {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Events emitted while nobody listens are dropped.
    pub fn emit(&self, session: MediaSessionId, kind: MediaEventKind) {
        let _ = self.sender.send(MediaEvent::new(session, kind));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.sender.subscribe()
    }
}

impl Default for MediaEventSender {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_EVENT_CAPACITY)
    }
}

/// Host media engine driving actual audio output.
///
/// A player holds at most one attached session. Calling [`attach`](Self::attach)
/// replaces the previous session; every status event afterwards carries the new
/// [`MediaSessionId`].
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Attach a local audio file as a fresh session, replacing the current one.
    async fn attach(&self, path: &Path) -> Result<MediaSessionId>;

    /// Remove the current session from the player, if any.
    async fn detach(&self) -> Result<()>;

    /// Start or resume output of the attached session.
    async fn play(&self) -> Result<()>;

    /// Pause output without releasing the session.
    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position within the attached session.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Current playback position, `None` without a session.
    async fn position(&self) -> Result<Option<Duration>>;

    /// Total duration of the attached media, `None` when unknown.
    async fn duration(&self) -> Result<Option<Duration>>;

    /// Subscribe to status events for every session this player attaches.
    fn subscribe(&self) -> broadcast::Receiver<MediaEvent>;
}
