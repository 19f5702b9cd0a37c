//! # Engine Events
//!
//! Notifications published by the playback engine and the local cache store.
//!
//! Every notification that reaches a [`PlaybackListener`](crate::listener::PlaybackListener)
//! is also available as an [`EngineEvent`] on the engine's optional
//! [`EventBus`](core_runtime::events::EventBus), so async consumers can
//! subscribe without implementing the listener trait.

use crate::state::{PlaybackState, PlayerState};
use core_runtime::events::{BusEvent, EventSeverity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Separator between artist and title in timed stream metadata.
const METADATA_SEPARATOR: &str = " - ";

/// Timed metadata carried inside the stream, e.g. `"Artist - Title"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub artist: Option<String>,
    pub title: Option<String>,
    /// The value exactly as the player reported it.
    pub raw: String,
}

impl TrackMetadata {
    /// Splits `raw` on the first `" - "` into artist and title.
    ///
    /// Without a separator the whole value is taken as the artist, matching
    /// how stations usually announce themselves.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();

        let (artist, title) = match trimmed.split_once(METADATA_SEPARATOR) {
            Some((artist, title)) => (non_empty(artist), non_empty(title)),
            None => (non_empty(trimmed), None),
        };

        Self { artist, title, raw }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Top-level event published on the engine event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineEvent {
    /// Playback engine notifications
    Playback(PlaybackEvent),
    /// Local cache notifications
    Cache(CacheEvent),
}

/// Notifications mirrored to registered listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Readiness of the current track changed.
    PlayerStateChanged { state: PlayerState },
    /// Transport activity changed.
    PlaybackStateChanged { state: PlaybackState },
    /// A new track was attached to the player.
    TrackChanged { url: Option<String> },
    /// Timed metadata arrived from the stream.
    MetadataChanged { metadata: TrackMetadata },
    /// The attached track played to its end.
    PlaybackFinished { url: Option<String> },
}

/// Notifications about cache resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum CacheEvent {
    /// The track was already on disk.
    Hit { url: String, path: PathBuf },
    /// A download started.
    DownloadStarted { url: String },
    /// A download finished and was moved into place.
    DownloadCompleted {
        url: String,
        path: PathBuf,
        bytes: u64,
    },
    /// A download failed; nothing was written to the cache.
    DownloadFailed { url: String, reason: String },
}

impl BusEvent for EngineEvent {
    fn description(&self) -> &str {
        match self {
            EngineEvent::Playback(e) => e.description(),
            EngineEvent::Cache(e) => e.description(),
        }
    }

    fn severity(&self) -> EventSeverity {
        match self {
            EngineEvent::Playback(PlaybackEvent::PlayerStateChanged {
                state: PlayerState::Error,
            }) => EventSeverity::Error,
            EngineEvent::Cache(CacheEvent::DownloadFailed { .. }) => EventSeverity::Warning,
            EngineEvent::Playback(PlaybackEvent::TrackChanged { .. })
            | EngineEvent::Playback(PlaybackEvent::PlaybackFinished { .. })
            | EngineEvent::Cache(CacheEvent::DownloadCompleted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

impl PlaybackEvent {
    pub fn description(&self) -> &str {
        match self {
            PlaybackEvent::PlayerStateChanged { .. } => "Player state changed",
            PlaybackEvent::PlaybackStateChanged { .. } => "Playback state changed",
            PlaybackEvent::TrackChanged { .. } => "Track changed",
            PlaybackEvent::MetadataChanged { .. } => "Stream metadata changed",
            PlaybackEvent::PlaybackFinished { .. } => "Track played to end",
        }
    }
}

impl CacheEvent {
    pub fn description(&self) -> &str {
        match self {
            CacheEvent::Hit { .. } => "Track served from cache",
            CacheEvent::DownloadStarted { .. } => "Track download started",
            CacheEvent::DownloadCompleted { .. } => "Track download completed",
            CacheEvent::DownloadFailed { .. } => "Track download failed",
        }
    }
}

impl From<PlaybackEvent> for EngineEvent {
    fn from(event: PlaybackEvent) -> Self {
        EngineEvent::Playback(event)
    }
}

impl From<CacheEvent> for EngineEvent {
    fn from(event: CacheEvent) -> Self {
        EngineEvent::Cache(event)
    }
}
