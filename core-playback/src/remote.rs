//! # Remote Commands
//!
//! Translates abstract transport commands from lock-screen, headset or
//! media-key integrations into engine and selector calls.

use crate::engine::PlaybackEngine;
use crate::error::Result;
use crate::selector::TrackSelector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Command received from a remote-control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteCommand {
    Play,
    Pause,
    TogglePlayPause,
    Stop,
    Next,
    Previous,
    SeekForward,
    SeekBackward,
}

/// Result reported back to the remote-control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Success,
    /// Nothing to act on: no track set, or an empty track list.
    NoActionableItem,
}

/// Dispatches [`RemoteCommand`]s.
#[derive(Debug, Clone)]
pub struct RemoteCommandHandler {
    engine: PlaybackEngine,
    selector: Arc<TrackSelector>,
}

impl RemoteCommandHandler {
    pub fn new(engine: PlaybackEngine, selector: Arc<TrackSelector>) -> Self {
        Self { engine, selector }
    }

    pub async fn handle(&self, command: RemoteCommand) -> CommandStatus {
        debug!(?command, "Remote command");

        match command {
            RemoteCommand::Next => return self.step(self.selector.next().await),
            RemoteCommand::Previous => return self.step(self.selector.previous().await),
            _ => {}
        }

        if !self.engine.has_track().await {
            return CommandStatus::NoActionableItem;
        }

        // Nothing to start until the track resolves; auto-play covers it.
        if matches!(command, RemoteCommand::Play | RemoteCommand::TogglePlayPause)
            && !self.engine.is_loaded().await
        {
            return CommandStatus::NoActionableItem;
        }

        match command {
            RemoteCommand::Play => self.engine.play().await,
            RemoteCommand::Pause => self.engine.pause().await,
            RemoteCommand::TogglePlayPause => self.engine.toggle_playing().await,
            RemoteCommand::Stop => self.engine.stop().await,
            RemoteCommand::SeekForward => self.engine.seek_forward().await,
            RemoteCommand::SeekBackward => self.engine.seek_backward().await,
            RemoteCommand::Next | RemoteCommand::Previous => {}
        }

        CommandStatus::Success
    }

    fn step<T>(&self, result: Result<Option<T>>) -> CommandStatus {
        match result {
            Ok(Some(_)) => CommandStatus::Success,
            Ok(None) => CommandStatus::NoActionableItem,
            Err(e) => {
                warn!(error = %e, "Remote track change failed");
                CommandStatus::NoActionableItem
            }
        }
    }
}
