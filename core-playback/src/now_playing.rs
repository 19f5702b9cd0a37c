//! Now-playing snapshot for lock-screen and remote-control surfaces.

use crate::engine::PlaybackEngine;
use crate::track::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a now-playing surface shows for the current track.
///
/// Title and artwork come from the [`Track`]; elapsed time and duration are
/// read from the engine at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlayingInfo {
    pub title: String,
    pub artwork: Option<String>,
    pub elapsed: Option<Duration>,
    pub duration: Option<Duration>,
}

impl NowPlayingInfo {
    /// Read elapsed time and duration for `track` from `engine`.
    pub async fn capture(track: &Track, engine: &PlaybackEngine) -> Self {
        Self {
            title: track.name.clone(),
            artwork: track.artwork().map(str::to_string),
            elapsed: engine.current_time().await,
            duration: engine.duration().await,
        }
    }

    /// Elapsed time as `HH:MM:SS`, zero while unavailable.
    pub fn elapsed_label(&self) -> String {
        format_clock(self.elapsed.unwrap_or_default())
    }

    /// Duration as `HH:MM:SS`, zero while unavailable.
    pub fn duration_label(&self) -> String {
        format_clock(self.duration.unwrap_or_default())
    }

    /// Fraction of the track played, in `0.0..=1.0`.
    pub fn progress(&self) -> Option<f64> {
        let duration = self.duration.filter(|d| !d.is_zero())?;
        let elapsed = self.elapsed.unwrap_or_default();
        Some((elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0))
    }
}

/// Formats `duration` as `HH:MM:SS`, truncating sub-second precision.
pub fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(Duration::ZERO), "00:00:00");
        assert_eq!(format_clock(Duration::from_millis(59_999)), "00:00:59");
        assert_eq!(format_clock(Duration::from_secs(61)), "00:01:01");
        assert_eq!(format_clock(Duration::from_secs(3 * 3600 + 25 * 60 + 7)), "03:25:07");
    }

    #[test]
    fn test_labels_and_progress() {
        let info = NowPlayingInfo {
            title: "Gul".to_string(),
            artwork: None,
            elapsed: Some(Duration::from_secs(30)),
            duration: Some(Duration::from_secs(120)),
        };

        assert_eq!(info.elapsed_label(), "00:00:30");
        assert_eq!(info.duration_label(), "00:02:00");
        assert_eq!(info.progress(), Some(0.25));
    }

    #[test]
    fn test_progress_unavailable() {
        let info = NowPlayingInfo {
            title: "Gul".to_string(),
            artwork: None,
            elapsed: None,
            duration: None,
        };

        assert_eq!(info.progress(), None);
        assert_eq!(info.elapsed_label(), "00:00:00");

        let zero = NowPlayingInfo {
            duration: Some(Duration::ZERO),
            ..info
        };
        assert_eq!(zero.progress(), None);
    }
}
