//! # Track Selector
//!
//! Ordered track list with a current index, driving the [`PlaybackEngine`].
//!
//! The selector only issues `set_track` / `reset_player` calls; it never
//! touches engine state directly. Moving past either end of the list wraps
//! around.

use crate::engine::{LoadHandle, PlaybackEngine};
use crate::error::{PlaybackError, Result};
use crate::now_playing::NowPlayingInfo;
use crate::state::PlayerState;
use crate::track::Track;
use parking_lot::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct Selection {
    tracks: Vec<Track>,
    current: Option<usize>,
    /// Track chosen by the last `select`, kept to skip reloading it.
    previous: Option<Track>,
}

/// Track list and current position for one [`PlaybackEngine`].
#[derive(Debug)]
pub struct TrackSelector {
    engine: PlaybackEngine,
    selection: Mutex<Selection>,
}

impl TrackSelector {
    pub fn new(engine: PlaybackEngine) -> Self {
        Self {
            engine,
            selection: Mutex::new(Selection::default()),
        }
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    /// Replace the track list.
    ///
    /// The current index follows the current track into the new list. When
    /// the new list no longer contains it, the selection is cleared and the
    /// engine is reset.
    pub async fn set_tracks(&self, tracks: Vec<Track>) {
        let reset = {
            let mut selection = self.selection.lock();
            let current = selection
                .current
                .and_then(|index| selection.tracks.get(index).cloned());
            selection.tracks = tracks;

            match current {
                Some(track) => match selection.tracks.iter().position(|t| *t == track) {
                    Some(index) => {
                        selection.current = Some(index);
                        false
                    }
                    None => {
                        selection.current = None;
                        selection.previous = None;
                        true
                    }
                },
                None => false,
            }
        };

        if reset {
            info!("Current track left the track list");
            self.engine.reset_player().await;
        }
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.selection.lock().tracks.clone()
    }

    pub fn len(&self) -> usize {
        self.selection.lock().tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.lock().tracks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.selection.lock().current
    }

    pub fn current_track(&self) -> Option<Track> {
        let selection = self.selection.lock();
        selection
            .current
            .and_then(|index| selection.tracks.get(index).cloned())
    }

    /// Make `index` current and load its track.
    ///
    /// Selecting the track that is already loaded does not reload it, unless
    /// the engine has no usable track (`UrlNotSet` or `Error`). Returns the
    /// load handle when a load was started.
    ///
    /// # Errors
    ///
    /// Returns `TrackIndexOutOfRange` if `index` is not in the list.
    pub async fn select(&self, index: usize) -> Result<Option<LoadHandle>> {
        self.select_inner(index, false).await
    }

    /// Load the next track, wrapping to the first after the last.
    ///
    /// Returns `Ok(None)` for an empty list.
    pub async fn next(&self) -> Result<Option<LoadHandle>> {
        let index = {
            let selection = self.selection.lock();
            let len = selection.tracks.len();
            if len == 0 {
                return Ok(None);
            }
            selection.current.map_or(0, |current| (current + 1) % len)
        };

        self.select_inner(index, true).await
    }

    /// Load the previous track, wrapping to the last before the first.
    ///
    /// Returns `Ok(None)` for an empty list.
    pub async fn previous(&self) -> Result<Option<LoadHandle>> {
        let index = {
            let selection = self.selection.lock();
            let len = selection.tracks.len();
            if len == 0 {
                return Ok(None);
            }
            match selection.current {
                Some(current) if current > 0 => current - 1,
                _ => len - 1,
            }
        };

        self.select_inner(index, true).await
    }

    /// Snapshot of what is playing, for lock-screen style surfaces.
    pub async fn now_playing(&self) -> Option<NowPlayingInfo> {
        let track = self.current_track()?;
        Some(NowPlayingInfo::capture(&track, &self.engine).await)
    }

    async fn select_inner(&self, index: usize, force: bool) -> Result<Option<LoadHandle>> {
        let (track, changed) = {
            let mut selection = self.selection.lock();
            let track = selection.tracks.get(index).cloned().ok_or(
                PlaybackError::TrackIndexOutOfRange {
                    index,
                    len: selection.tracks.len(),
                },
            )?;

            let changed = selection.previous.as_ref() != Some(&track);
            selection.current = Some(index);
            selection.previous = Some(track.clone());
            (track, changed)
        };

        if !force && !changed {
            let state = self.engine.player_state().await;
            if !matches!(state, PlayerState::UrlNotSet | PlayerState::Error) {
                debug!(index, "Track already selected");
                return Ok(None);
            }
        }

        debug!(index, name = %track.name, "Selecting track");
        Ok(self.engine.set_track(Some(track.source_url)).await)
    }
}
