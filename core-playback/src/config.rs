//! # Engine Configuration
//!
//! Configuration types for the playback engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Start playing as soon as a newly set track is attached.
    ///
    /// Default: true.
    #[serde(default = "default_auto_play")]
    pub auto_play: bool,

    /// Step used by `seek_forward` / `seek_backward`.
    ///
    /// Default: 10 seconds.
    #[serde(default = "default_seek_step")]
    pub seek_step: Duration,

    /// Distance kept from the end of the track when seeking forward, so a
    /// forward seek never lands on or past the total duration.
    ///
    /// Default: 1 second.
    #[serde(default = "default_seek_end_margin")]
    pub seek_end_margin: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_play: default_auto_play(),
            seek_step: default_seek_step(),
            seek_end_margin: default_seek_end_margin(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable auto-play.
    pub fn with_auto_play(mut self, enabled: bool) -> Self {
        self.auto_play = enabled;
        self
    }

    /// Set the seek step.
    pub fn with_seek_step(mut self, step: Duration) -> Self {
        self.seek_step = step;
        self
    }

    /// Set the end-of-track margin for forward seeks.
    pub fn with_seek_end_margin(mut self, margin: Duration) -> Self {
        self.seek_end_margin = margin;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.seek_step.is_zero() {
            return Err("seek_step must be > 0".to_string());
        }

        if self.seek_end_margin.is_zero() {
            return Err("seek_end_margin must be > 0".to_string());
        }

        Ok(())
    }
}

fn default_auto_play() -> bool {
    true
}

fn default_seek_step() -> Duration {
    Duration::from_secs(10)
}

fn default_seek_end_margin() -> Duration {
    Duration::from_secs(1)
}
