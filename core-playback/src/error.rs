//! # Playback Error Types
//!
//! Error types for track caching and engine operations.
//!
//! Errors never escape the engine's transport calls as values a UI has to
//! handle: a failed resolve or a failed media session is reported by moving
//! the player state to [`PlayerState::Error`](crate::state::PlayerState::Error).
//! `PlaybackError` is what the cache store, the configuration and the bridges
//! return internally.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// The track URL cannot be turned into a cache entry.
    #[error("Invalid track URL: {0}")]
    InvalidUrl(String),

    /// A track index outside the current track list was selected.
    #[error("Track index {index} out of range for {len} tracks")]
    TrackIndexOutOfRange { index: usize, len: usize },

    // ========================================================================
    // Cache Errors
    // ========================================================================
    /// Downloading the track failed (network error, HTTP status, timeout).
    #[error("Failed to fetch {url}: {reason}")]
    CacheFetchFailed { url: String, reason: String },

    /// Writing the downloaded track into the cache directory failed.
    #[error("Failed to write cache file: {0}")]
    CacheWriteFailed(String),

    // ========================================================================
    // Platform/Adapter Errors
    // ========================================================================
    /// The host media player reported a failure.
    #[error("Media player error: {0}")]
    Media(String),

    /// A bridge call failed outside of a more specific context.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Configuration values are invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of failures as observers see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No source is configured. A resting state, not a failure.
    UrlNotSet,
    /// Network or filesystem failure while resolving a track.
    CacheFetchFailure,
    /// The media session itself failed.
    UnderlyingPlaybackFailure,
}

impl PlaybackError {
    /// Classifies this error into the kind observers see.
    ///
    /// Caller mistakes (bad index, bad configuration, internal faults) never
    /// reach the player state and have no kind.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PlaybackError::InvalidUrl(_)
            | PlaybackError::CacheFetchFailed { .. }
            | PlaybackError::CacheWriteFailed(_) => Some(ErrorKind::CacheFetchFailure),
            PlaybackError::Media(_) | PlaybackError::Bridge(_) => {
                Some(ErrorKind::UnderlyingPlaybackFailure)
            }
            PlaybackError::TrackIndexOutOfRange { .. }
            | PlaybackError::Config(_)
            | PlaybackError::Internal(_) => None,
        }
    }

    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        matches!(self, PlaybackError::CacheFetchFailed { .. })
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
