//! Track references handed to play queues
//!
//! A `TrackRef` is everything the queue layer needs to know about a playable
//! item. It is produced by the catalog/search layer and never mutated
//! afterwards.

use super::ids::TrackId;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Opaque reference to a track's artwork (URL, cache key, file path...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtworkRef(String);

impl ArtworkRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Immutable description of a playable item
///
/// Two references are equal when their ids are equal; title, artists and the
/// rest are display data and do not take part in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRef {
    id: TrackId,
    title: String,
    #[serde(default)]
    artists: Vec<String>,
    #[serde(default)]
    duration_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    artwork: Option<ArtworkRef>,
}

impl TrackRef {
    /// Create a track reference with no artists, zero duration and no artwork
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artists: Vec::new(),
            duration_secs: 0,
            artwork: None,
        }
    }

    #[must_use]
    pub fn with_artists<I, S>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artists = artists.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_duration_secs(mut self, duration_secs: u64) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    #[must_use]
    pub fn with_artwork(mut self, artwork: ArtworkRef) -> Self {
        self.artwork = Some(artwork);
        self
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artists(&self) -> &[String] {
        &self.artists
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn artwork(&self) -> Option<&ArtworkRef> {
        self.artwork.as_ref()
    }
}

impl PartialEq for TrackRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TrackRef {}

impl Hash for TrackRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
