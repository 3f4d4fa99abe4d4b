//! Player and board events
//!
//! Two event streams cross this crate:
//! - `PlayerEvent`: emitted by the player, folded into the bound queue's cursor
//! - `BoardEvent`: emitted by the board so UI surfaces can refresh without polling

use queueboard_core::QueueId;
use serde::{Deserialize, Serialize};

/// Events emitted asynchronously by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Playback moved to another item (track finished, next/previous pressed)
    Advanced {
        /// Index into the item list last handed to `set_items`
        index: usize,
    },

    /// The user scrubbed or jumped to another item
    Seeked {
        /// Index into the item list last handed to `set_items`
        index: usize,
    },

    /// The player shut down; it will not accept or emit anything further
    Released,
}

impl PlayerEvent {
    /// Item index carried by the event, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            PlayerEvent::Advanced { index } | PlayerEvent::Seeked { index } => Some(*index),
            PlayerEvent::Released => None,
        }
    }
}

/// Events emitted by the queue board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// A queue was created by `add`
    QueueCreated { id: QueueId, title: String },

    /// Tracks were added, moved, removed, or the shuffle view changed
    QueueUpdated { id: QueueId, length: usize },

    /// A queue was removed
    QueueRemoved { id: QueueId },

    /// The queue bound to the player changed (`None` once nothing is bound)
    ActiveQueueChanged { id: Option<QueueId> },

    /// The playing position of a queue changed
    PositionChanged { id: QueueId, index: Option<usize> },
}
