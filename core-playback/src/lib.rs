//! # Playback Core
//!
//! Cache-backed playback engine and the state observers consume.
//!
//! ## Overview
//!
//! This module handles:
//! - Resolving remote track URLs to local files (`cache`)
//! - The player readiness and playback activity state machines (`engine`)
//! - Listener registration and bus events for UI and remote surfaces
//! - Track list navigation with wrap-around (`selector`)
//! - Remote-control commands and now-playing snapshots
//!
//! Audio decoding is not done here: the engine drives a host
//! [`MediaPlayer`](bridge_traits::MediaPlayer) implementation.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod listener;
pub mod now_playing;
pub mod remote;
pub mod selector;
pub mod state;
pub mod track;

pub use cache::{CacheConfig, CacheKeyStrategy, CacheStats, LocalCacheStore, ResolvedTrack};
pub use config::EngineConfig;
pub use engine::{LoadHandle, LoadOutcome, PlaybackEngine};
pub use error::{ErrorKind, PlaybackError, Result};
pub use events::{CacheEvent, EngineEvent, PlaybackEvent, TrackMetadata};
pub use listener::{ListenerId, ListenerRegistry, PlaybackListener};
pub use now_playing::{format_clock, NowPlayingInfo};
pub use remote::{CommandStatus, RemoteCommand, RemoteCommandHandler};
pub use selector::TrackSelector;
pub use state::{PlaybackState, PlayerState};
pub use track::Track;
