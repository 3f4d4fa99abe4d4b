//! Persistence records
//!
//! Plain data exchanged with a `QueueStore`. The store treats these as opaque
//! payloads; the playback crate validates them on restore.

use super::ids::QueueId;
use super::track::TrackRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Saved state of a single queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    pub id: QueueId,
    pub title: String,
    /// Canonical order
    pub tracks: Vec<TrackRef>,
    /// Canonical indices in shuffled play order, present while shuffled
    pub shuffle_order: Option<Vec<usize>>,
    /// Index into the active order (shuffle order when present)
    pub cursor: Option<usize>,
    pub created_at: DateTime<Utc>,
    pub touched_at: DateTime<Utc>,
    /// Recency rank; higher means touched more recently
    pub touch_seq: u64,
}

/// Saved state of the whole queue board
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRecord {
    pub queues: Vec<QueueRecord>,
    /// Queue that was bound to the player when the snapshot was taken
    pub active_queue_id: Option<QueueId>,
}

impl BoardRecord {
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
