use serde::{Deserialize, Serialize};

/// A playable remote track.
///
/// Two tracks are the same track only when name, artwork and source URL all
/// match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    /// Artwork reference; empty when the track has none.
    #[serde(default)]
    pub artwork: String,
    pub source_url: String,
}

impl Track {
    pub fn new(name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artwork: String::new(),
            source_url: source_url.into(),
        }
    }

    pub fn with_artwork(mut self, artwork: impl Into<String>) -> Self {
        self.artwork = artwork.into();
        self
    }

    pub fn artwork(&self) -> Option<&str> {
        if self.artwork.is_empty() {
            None
        } else {
            Some(&self.artwork)
        }
    }
}
