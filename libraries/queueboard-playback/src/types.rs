//! Public value types returned by the queue board

use chrono::{DateTime, Utc};
use queueboard_core::{QueueId, TrackRef};
use serde::{Deserialize, Serialize};

/// How a caller names the queue it wants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueRef {
    /// Exact queue id
    Id(QueueId),

    /// Display title; the earliest-created queue with this title wins
    Title(String),
}

impl From<QueueId> for QueueRef {
    fn from(id: QueueId) -> Self {
        QueueRef::Id(id)
    }
}

impl From<&QueueId> for QueueRef {
    fn from(id: &QueueId) -> Self {
        QueueRef::Id(id.clone())
    }
}

impl From<&str> for QueueRef {
    fn from(title: &str) -> Self {
        QueueRef::Title(title.to_string())
    }
}

impl From<String> for QueueRef {
    fn from(title: String) -> Self {
        QueueRef::Title(title)
    }
}

/// Listing entry for queue pickers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    pub id: QueueId,
    pub title: String,
    pub item_count: usize,
    pub duration_secs: u64,
    pub shuffled: bool,
    /// Whether this queue is currently bound to the player
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub touched_at: DateTime<Utc>,
}

/// Full point-in-time copy of a queue
///
/// Owned data; later mutations of the queue never show through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub id: QueueId,
    pub title: String,
    /// Canonical (insertion) order
    pub canonical: Vec<TrackRef>,
    /// Order playback follows: the shuffle view if enabled, else canonical
    pub current_order: Vec<TrackRef>,
    pub shuffled: bool,
    /// Index into `current_order` of the playing item
    pub cursor: Option<usize>,
    pub duration_secs: u64,
    pub created_at: DateTime<Utc>,
    pub touched_at: DateTime<Utc>,
}

impl QueueSnapshot {
    /// Track at the cursor, if any
    pub fn current_track(&self) -> Option<&TrackRef> {
        self.cursor.and_then(|index| self.current_order.get(index))
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}
