//! Listener registration for engine notifications.
//!
//! Any number of listeners can be registered; each receives every
//! notification in registration order. Removing one listener never affects
//! the others.

use crate::events::{EngineEvent, PlaybackEvent, TrackMetadata};
use crate::state::{PlaybackState, PlayerState};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Observer of playback engine notifications.
///
/// Every method has an empty default so implementors only override what they
/// need. Callbacks run synchronously on the engine's task while its state
/// lock is held: keep them short and never block on engine calls inside them.
pub trait PlaybackListener: Send + Sync {
    fn on_player_state_changed(&self, _state: PlayerState) {}

    fn on_playback_state_changed(&self, _state: PlaybackState) {}

    fn on_track_changed(&self, _url: Option<&str>) {}

    fn on_metadata_changed(&self, _metadata: &TrackMetadata) {}

    fn on_playback_finished(&self, _url: Option<&str>) {}
}

/// Handle returned by [`ListenerRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered set of listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn PlaybackListener>)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Arc<dyn PlaybackListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    /// Returns `false` when `id` was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Delivers a playback notification to every listener.
    ///
    /// Cache events have no listener callback and are skipped.
    pub fn dispatch(&self, event: &EngineEvent) {
        let EngineEvent::Playback(event) = event else {
            return;
        };

        // Snapshot so callbacks may register or unregister listeners.
        let listeners: Vec<Arc<dyn PlaybackListener>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            match event {
                PlaybackEvent::PlayerStateChanged { state } => {
                    listener.on_player_state_changed(*state)
                }
                PlaybackEvent::PlaybackStateChanged { state } => {
                    listener.on_playback_state_changed(*state)
                }
                PlaybackEvent::TrackChanged { url } => listener.on_track_changed(url.as_deref()),
                PlaybackEvent::MetadataChanged { metadata } => {
                    listener.on_metadata_changed(metadata)
                }
                PlaybackEvent::PlaybackFinished { url } => {
                    listener.on_playback_finished(url.as_deref())
                }
            }
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
