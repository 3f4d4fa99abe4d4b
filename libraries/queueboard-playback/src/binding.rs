//! Active queue binding
//!
//! Connects the board's active queue to the player: pushes the queue's
//! active order into the player, and runs a pump task that folds the
//! player's advance/seek events back into the queue's cursor.
//!
//! Each binding carries a generation number. Events are only applied while
//! the queue still holds a binding with the same generation, so an event
//! from a superseded binding can never move the cursor of the wrong queue.
//! Within one binding, an event can still be older than the last re-sync;
//! the pump therefore takes its position from the player, not the event.

use crate::board::QueueBoard;
use crate::error::{QueueError, Result};
use crate::events::PlayerEvent;
use crate::player::Player;
use crate::queue::Queue;
use queueboard_core::TrackRef;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Live association between one queue and the player
pub(crate) struct Binding {
    player: Arc<dyn Player>,
    generation: u64,
    pump: JoinHandle<()>,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Where playback should start when `queue` is bound
///
/// Continuity wins: if `playing` (the track the player is on right now) is
/// in the queue, start there. If the stored cursor already points at that
/// track it is kept, so duplicates do not jump to the first copy.
pub(crate) fn start_index(queue: &Queue, playing: Option<&TrackRef>, prefer_playing: bool) -> usize {
    let stored = queue.cursor().filter(|&position| position < queue.len());

    if let (true, Some(track)) = (prefer_playing, playing) {
        let stored_matches = stored
            .and_then(|position| queue.track_at(position))
            .is_some_and(|current| current == track);

        if !stored_matches {
            if let Some(position) = queue.position_of(track.id()) {
                return position;
            }
        }
    }

    stored.unwrap_or(0)
}

impl Binding {
    /// Bind `queue` to `player`
    ///
    /// Nothing is changed (neither the queue cursor nor any existing binding)
    /// unless the player accepts the new item list.
    pub(crate) fn bind(
        queue: &mut Queue,
        player: Arc<dyn Player>,
        generation: u64,
        playing: Option<&TrackRef>,
        prefer_playing: bool,
        board: Weak<QueueBoard>,
    ) -> Result<Self> {
        if !player.is_available() {
            return Err(QueueError::PlayerUnavailable(
                "player is not accepting a queue".to_string(),
            ));
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            QueueError::PlayerUnavailable("no Tokio runtime to receive player events".to_string())
        })?;

        // Subscribe first so no event emitted after set_items is missed
        let events = player.subscribe();

        let start = start_index(queue, playing, prefer_playing);
        player
            .set_items(queue.current_order(), start)
            .map_err(|err| QueueError::PlayerUnavailable(err.to_string()))?;

        if !queue.is_empty() {
            queue.set_cursor(start)?;
        }

        let pump = runtime.spawn(pump_events(board, generation, events));

        debug!(
            "Bound queue {} ({} tracks) at index {} [generation {}]",
            queue.id(),
            queue.len(),
            start,
            generation
        );

        Ok(Self {
            player,
            generation,
            pump,
        })
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `other` is the same player instance this binding drives
    pub(crate) fn drives(&self, other: &Arc<dyn Player>) -> bool {
        Arc::as_ptr(&self.player).cast::<()>() == Arc::as_ptr(other).cast::<()>()
    }

    /// Push the queue's current order again after a structural change
    pub(crate) fn sync(&self, queue: &mut Queue) -> Result<()> {
        if queue.cursor().is_none() && !queue.is_empty() {
            queue.set_cursor(0)?;
        }

        let start = queue.cursor().unwrap_or(0);
        self.player
            .set_items(queue.current_order(), start)
            .map_err(|err| QueueError::PlayerUnavailable(err.to_string()))
    }

    /// Re-read the player's position, used after missed events and before edits
    pub(crate) fn reconcile(&self, queue: &mut Queue) -> Result<()> {
        match self.player.current_index() {
            Some(index) => queue.set_cursor(index),
            None => Ok(()),
        }
    }

    /// Fold a reported advance/seek into the cursor
    ///
    /// The reported index refers to whatever list the player held when the
    /// event was sent, which may predate the last `sync`. The player's live
    /// index always refers to the order it holds now, so that one wins.
    pub(crate) fn follow(&self, queue: &mut Queue, reported: usize) -> Result<()> {
        let Some(live) = self.player.current_index() else {
            debug!(
                "Dropping event for index {}: player holds nothing [generation {}]",
                reported, self.generation
            );
            return Ok(());
        };

        if live != reported {
            debug!(
                "Event for index {} superseded; player is at {} [generation {}]",
                reported, live, self.generation
            );
        }
        queue.set_cursor(live)
    }

    /// Leave the player empty and stopped
    pub(crate) fn stop_player(&self) {
        if let Err(err) = self.player.set_items(Vec::new(), 0) {
            debug!("Player did not accept stop: {}", err);
        }
    }

    /// Detach from the player's events
    ///
    /// The cursor needs no flushing: every event was already written to the
    /// queue as it arrived.
    pub(crate) fn unbind(self) {
        self.pump.abort();
        debug!("Unbound generation {}", self.generation);
    }
}

/// Forward player events to the board until the binding goes away
async fn pump_events(
    board: Weak<QueueBoard>,
    generation: u64,
    mut events: broadcast::Receiver<PlayerEvent>,
) {
    loop {
        let received = events.recv().await;

        let Some(board) = board.upgrade() else {
            break;
        };

        let (outcome, finished) = match received {
            Ok(event) => (
                board.apply_player_event(generation, event),
                event == PlayerEvent::Released,
            ),
            Err(RecvError::Lagged(missed)) => {
                warn!(
                    "Missed {} player events; re-reading position [generation {}]",
                    missed, generation
                );
                (board.reconcile_binding(generation), false)
            }
            Err(RecvError::Closed) => (
                board.apply_player_event(generation, PlayerEvent::Released),
                true,
            ),
        };

        match outcome {
            Ok(()) => {}
            Err(QueueError::ConcurrentModification(reason)) => {
                debug!("Player event pump stopping: {}", reason);
                break;
            }
            Err(err) => warn!("Ignoring player event: {}", err),
        }

        if finished {
            break;
        }
    }
}
