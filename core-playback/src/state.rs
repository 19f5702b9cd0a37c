//! Player readiness and playback activity states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Readiness of the current track.
///
/// Starts at `UrlNotSet`, goes to `Loading` when a track is set, then
/// `ReadyToPlay` or `Error`. While a session is attached it moves between
/// `Loading` and `LoadingFinished` as the buffer drains and refills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    #[default]
    UrlNotSet,
    Loading,
    ReadyToPlay,
    LoadingFinished,
    Error,
}

impl PlayerState {
    /// Returns a human-readable description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            PlayerState::UrlNotSet => "URL is not set",
            PlayerState::Loading => "Loading",
            PlayerState::ReadyToPlay => "Ready to play",
            PlayerState::LoadingFinished => "Loading finished",
            PlayerState::Error => "Error",
        }
    }

    /// Whether the attached media can be played right now.
    pub fn is_playable(&self) -> bool {
        matches!(self, PlayerState::ReadyToPlay | PlayerState::LoadingFinished)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// What the transport is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlaybackState {
    pub fn description(&self) -> &'static str {
        match self {
            PlaybackState::Playing => "Player is playing",
            PlaybackState::Paused => "Player is paused",
            PlaybackState::Stopped => "Player is stopped",
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
