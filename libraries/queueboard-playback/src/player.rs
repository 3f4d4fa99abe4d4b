//! Player abstraction
//!
//! The board never decodes or renders audio. It talks to whatever engine the
//! platform provides through this trait.

use crate::events::PlayerEvent;
use queueboard_core::TrackRef;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;

/// Default capacity of the in-memory player's event channel
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Errors reported by a player implementation
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The player has been released and accepts nothing further
    #[error("Player released")]
    Released,

    /// The player refused the item list
    #[error("Player rejected items: {0}")]
    Rejected(String),
}

/// Minimal interface the board needs from the playback engine
///
/// Implementations must not call back into the board from inside these
/// methods: `set_items` is invoked while the bound queue is locked. Report
/// progress through the event channel instead.
pub trait Player: Send + Sync {
    /// Replace the playable item list and start at `start_index`
    ///
    /// An empty list means "stop and hold nothing".
    fn set_items(&self, tracks: Vec<TrackRef>, start_index: usize) -> Result<(), PlayerError>;

    /// Index of the playing item in the last list handed to `set_items`
    fn current_index(&self) -> Option<usize>;

    /// Register for advance/seek/release notifications
    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent>;

    /// Whether the player can accept a binding right now
    fn is_available(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
struct MemoryPlayerState {
    items: Vec<TrackRef>,
    index: Option<usize>,
    released: bool,
    loads: usize,
}

/// Player that only keeps its item list in memory
///
/// Useful for headless embedders and tests: it records what the board pushes
/// and lets the caller simulate track changes, seeks and shutdown.
#[derive(Debug)]
pub struct MemoryPlayer {
    state: Mutex<MemoryPlayerState>,
    events: broadcast::Sender<PlayerEvent>,
}

impl MemoryPlayer {
    pub fn new() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create a player whose event channel buffers `capacity` events
    pub fn with_event_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            state: Mutex::new(MemoryPlayerState::default()),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryPlayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Items from the most recent `set_items`
    pub fn items(&self) -> Vec<TrackRef> {
        self.lock().items.clone()
    }

    /// Track at the current index
    pub fn current_track(&self) -> Option<TrackRef> {
        let state = self.lock();
        state.index.and_then(|i| state.items.get(i).cloned())
    }

    /// True when the player holds no items
    pub fn is_stopped(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn is_released(&self) -> bool {
        self.lock().released
    }

    /// How many times `set_items` succeeded
    pub fn load_count(&self) -> usize {
        self.lock().loads
    }

    /// Simulate playback moving to `index`; returns false if out of range
    pub fn advance_to(&self, index: usize) -> bool {
        self.move_to(index, PlayerEvent::Advanced { index })
    }

    /// Simulate the user jumping to `index`; returns false if out of range
    pub fn seek_to(&self, index: usize) -> bool {
        self.move_to(index, PlayerEvent::Seeked { index })
    }

    /// Simulate the current track finishing
    pub fn skip_next(&self) -> Option<usize> {
        let next = self.lock().index.map_or(0, |i| i + 1);
        self.advance_to(next).then_some(next)
    }

    fn move_to(&self, index: usize, event: PlayerEvent) -> bool {
        {
            let mut state = self.lock();
            if state.released || index >= state.items.len() {
                return false;
            }
            state.index = Some(index);
        }
        // No subscribers is fine
        let _ = self.events.send(event);
        true
    }

    /// Shut the player down and notify subscribers
    pub fn release(&self) {
        {
            let mut state = self.lock();
            state.released = true;
            state.items.clear();
            state.index = None;
        }
        let _ = self.events.send(PlayerEvent::Released);
    }
}

impl Default for MemoryPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for MemoryPlayer {
    fn set_items(&self, tracks: Vec<TrackRef>, start_index: usize) -> Result<(), PlayerError> {
        let mut state = self.lock();
        if state.released {
            return Err(PlayerError::Released);
        }
        if !tracks.is_empty() && start_index >= tracks.len() {
            return Err(PlayerError::Rejected(format!(
                "start index {} out of range for {} items",
                start_index,
                tracks.len()
            )));
        }

        state.index = (!tracks.is_empty()).then_some(start_index);
        state.items = tracks;
        state.loads += 1;
        Ok(())
    }

    fn current_index(&self) -> Option<usize> {
        self.lock().index
    }

    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    fn is_available(&self) -> bool {
        !self.lock().released
    }
}
