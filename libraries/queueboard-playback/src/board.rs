//! Queue board: the registry of named queues
//!
//! Owns every queue, tracks which one is bound to the player, and is the only
//! way callers mutate queues. Each queue sits in its own slot behind a mutex;
//! the board's own mutex only guards the slot list and the active binding.
//!
//! Lock order is always board -> slot. No slot lock is ever held while the
//! board lock is being acquired.

use crate::binding::Binding;
use crate::config::BoardConfig;
use crate::error::{QueueError, Result};
use crate::events::{BoardEvent, PlayerEvent};
use crate::persistence::PersistenceHandle;
use crate::player::Player;
use crate::queue::Queue;
use crate::types::{QueueRef, QueueSnapshot, QueueSummary};
use queueboard_core::{BoardRecord, QueueId, QueueStore, TrackRef};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Buffered board events per subscriber before it starts lagging
const BOARD_EVENT_CAPACITY: usize = 256;

struct SlotState {
    queue: Queue,
    binding: Option<Binding>,
    /// Set once the queue is removed; late operations on a stale handle fail
    retired: bool,
}

struct QueueSlot {
    id: QueueId,
    title: String,
    state: Mutex<SlotState>,
}

impl QueueSlot {
    fn new(queue: Queue) -> Arc<Self> {
        Arc::new(Self {
            id: queue.id().clone(),
            title: queue.title().to_string(),
            state: Mutex::new(SlotState {
                queue,
                binding: None,
                retired: false,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Clone)]
struct ActiveBinding {
    slot: Arc<QueueSlot>,
    generation: u64,
}

struct BoardState {
    /// Creation order; title lookups take the first match
    slots: Vec<Arc<QueueSlot>>,
    active: Option<ActiveBinding>,
    next_generation: u64,
}

impl BoardState {
    fn by_id(&self, id: &QueueId) -> Option<Arc<QueueSlot>> {
        self.slots.iter().find(|slot| &slot.id == id).cloned()
    }

    fn by_title(&self, title: &str) -> Option<Arc<QueueSlot>> {
        self.slots.iter().find(|slot| slot.title == title).cloned()
    }

    fn most_recent(&self) -> Option<Arc<QueueSlot>> {
        self.slots
            .iter()
            .max_by_key(|slot| slot.lock().queue.touch_seq())
            .cloned()
    }

    fn is_active(&self, slot: &Arc<QueueSlot>) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(&active.slot, slot))
    }
}

/// Registry of named play queues bound to a single player
///
/// Construct once and share as `Arc<QueueBoard>`; activation needs the `Arc`
/// so player events can find their way back to the board.
pub struct QueueBoard {
    state: Mutex<BoardState>,
    touch_counter: AtomicU64,
    config: BoardConfig,
    events: broadcast::Sender<BoardEvent>,
    persistence: Option<PersistenceHandle>,
}

impl std::fmt::Debug for QueueBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueBoard")
            .field("queues", &self.len())
            .field("active", &self.current_queue_id())
            .finish_non_exhaustive()
    }
}

impl QueueBoard {
    /// Create an empty board without persistence
    pub fn new(config: BoardConfig) -> Self {
        Self::from_parts(config, Vec::new(), 1, None)
    }

    /// Create an empty board that saves every change to `store`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_persistence(config: BoardConfig, store: Arc<dyn QueueStore>) -> Result<Self> {
        let (handle, _worker) = PersistenceHandle::spawn(store, config.save_debounce())?;
        Ok(Self::from_parts(config, Vec::new(), 1, Some(handle)))
    }

    /// Rebuild a board from a saved record
    ///
    /// No player is bound afterwards. The queue that was active when the
    /// record was saved becomes the most recently touched one, so
    /// `set_curr_queue(None, ..)` resumes it.
    pub fn from_record(
        config: BoardConfig,
        record: BoardRecord,
        persistence: Option<PersistenceHandle>,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut queues = Vec::with_capacity(record.queues.len());

        for queue_record in record.queues {
            if !seen.insert(queue_record.id.clone()) {
                warn!("Skipping duplicate saved queue {}", queue_record.id);
                continue;
            }
            queues.push(Queue::from_record(queue_record));
        }

        let mut next_touch = queues.iter().map(Queue::touch_seq).max().unwrap_or(0) + 1;

        if let Some(active_id) = &record.active_queue_id {
            match queues.iter_mut().find(|queue| queue.id() == active_id) {
                Some(queue) => {
                    queue.touch(next_touch);
                    next_touch += 1;
                }
                None => warn!("Saved active queue {} no longer exists", active_id),
            }
        }

        let slots = queues.into_iter().map(QueueSlot::new).collect();
        Self::from_parts(config, slots, next_touch, persistence)
    }

    /// Load the saved board from `store` and keep saving to it
    ///
    /// With persistence disabled in `config` the store is ignored and an
    /// empty, non-persistent board is returned.
    pub async fn restore(config: BoardConfig, store: Arc<dyn QueueStore>) -> Result<Self> {
        if !config.persistence.enabled {
            debug!("Persistence disabled; starting with an empty queue board");
            return Ok(Self::new(config));
        }

        let record = store.load().await?;
        info!("Restoring {} saved queues", record.queues.len());

        let (handle, _worker) = PersistenceHandle::spawn(store, config.save_debounce())?;
        Ok(Self::from_record(config, record, Some(handle)))
    }

    fn from_parts(
        config: BoardConfig,
        slots: Vec<Arc<QueueSlot>>,
        next_touch: u64,
        persistence: Option<PersistenceHandle>,
    ) -> Self {
        let (events, _) = broadcast::channel(BOARD_EVENT_CAPACITY);
        Self {
            state: Mutex::new(BoardState {
                slots,
                active: None,
                next_generation: 1,
            }),
            touch_counter: AtomicU64::new(next_touch),
            config,
            events,
            persistence,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_touch(&self) -> u64 {
        self.touch_counter.fetch_add(1, Ordering::Relaxed)
    }

    fn emit(&self, event: BoardEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn persist(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.save(self.to_record());
        }
    }

    fn slot(&self, id: &QueueId) -> Result<Arc<QueueSlot>> {
        self.lock_state()
            .by_id(id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Register for board change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Number of queues on the board
    pub fn len(&self) -> usize {
        self.lock_state().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_state().slots.is_empty()
    }

    /// Id of the queue bound to the player, if any
    pub fn current_queue_id(&self) -> Option<QueueId> {
        self.lock_state()
            .active
            .as_ref()
            .map(|active| active.slot.id.clone())
    }

    /// Add tracks to the queue titled `title`, creating it if needed
    ///
    /// A new queue is always populated with replace semantics, whatever
    /// `delta` says. For an existing queue see [`Queue::add`].
    pub fn add(
        &self,
        title: &str,
        items: Vec<TrackRef>,
        force_insert: bool,
        delta: bool,
    ) -> Result<QueueId> {
        let mut board = self.lock_state();
        let Some(existing) = board.by_title(title) else {
            let mut queue = Queue::new(title, self.next_touch());
            let inserted = queue.add(items, force_insert, false);
            let id = queue.id().clone();
            board.slots.push(QueueSlot::new(queue));
            drop(board);

            info!("Created queue '{}' ({}) with {} tracks", title, id, inserted);
            self.emit(BoardEvent::QueueCreated {
                id: id.clone(),
                title: title.to_string(),
            });
            self.persist();
            return Ok(id);
        };

        // Lock the slot before releasing the board so it cannot be retired in between
        let guard = existing.lock();
        drop(board);

        let id = existing.id.clone();
        self.mutate_locked(&existing, guard, |queue| {
            let inserted = queue.add(items, force_insert, delta);
            debug!("Added {} tracks to queue '{}'", inserted, title);
            Ok(((), !delta || inserted > 0))
        })?;

        Ok(id)
    }

    /// Summaries of every queue, most recently touched first
    pub fn get_all_queues(&self) -> Vec<QueueSummary> {
        let board = self.lock_state();
        let mut entries: Vec<(u64, QueueSummary)> = board
            .slots
            .iter()
            .map(|slot| {
                let state = slot.lock();
                (
                    state.queue.touch_seq(),
                    state.queue.summary(board.is_active(slot)),
                )
            })
            .collect();
        drop(board);

        entries.sort_by_key(|(seq, _)| Reverse(*seq));
        entries.into_iter().map(|(_, summary)| summary).collect()
    }

    /// Owned copy of one queue
    pub fn get_queue(&self, id: &QueueId) -> Result<QueueSnapshot> {
        let slot = self.slot(id)?;
        let state = slot.lock();
        if state.retired {
            return Err(QueueError::NotFound(id.to_string()));
        }
        Ok(state.queue.snapshot())
    }

    /// Id of the first queue created with `title`
    pub fn find_by_title(&self, title: &str) -> Option<QueueId> {
        self.lock_state().by_title(title).map(|slot| slot.id.clone())
    }

    /// Remove a queue
    ///
    /// Removing the active queue is allowed: the binding is dropped and the
    /// player is left holding nothing.
    pub fn remove_queue(&self, id: &QueueId) -> Result<()> {
        let mut board = self.lock_state();
        let position = board
            .slots
            .iter()
            .position(|slot| &slot.id == id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))?;

        let slot = board.slots.remove(position);
        let was_active = board.is_active(&slot);
        if was_active {
            board.active = None;
        }

        {
            let mut state = slot.lock();
            state.retired = true;
            if let Some(binding) = state.binding.take() {
                binding.stop_player();
                binding.unbind();
            }
        }
        drop(board);

        info!("Removed queue '{}' ({})", slot.title, id);
        self.emit(BoardEvent::QueueRemoved { id: id.clone() });
        if was_active {
            self.emit(BoardEvent::ActiveQueueChanged { id: None });
        }
        self.persist();
        Ok(())
    }

    /// Bind a queue to `player`
    ///
    /// `target` picks the queue by id or title; `None` picks the most
    /// recently touched one. On error nothing changes: the previously active
    /// queue (if any) stays bound.
    pub fn set_curr_queue(
        self: &Arc<Self>,
        target: Option<QueueRef>,
        player: Arc<dyn Player>,
    ) -> Result<QueueId> {
        let mut board = self.lock_state();

        if board.slots.is_empty() {
            return Err(QueueError::NoQueuesAvailable);
        }

        let slot = match target {
            Some(QueueRef::Id(id)) => board
                .by_id(&id)
                .ok_or_else(|| QueueError::NotFound(id.to_string()))?,
            Some(QueueRef::Title(title)) => board
                .by_title(&title)
                .ok_or(QueueError::NotFound(title))?,
            None => board.most_recent().ok_or(QueueError::NoQueuesAvailable)?,
        };

        let previous = board.active.clone();

        if let Some(active) = &previous {
            if Arc::ptr_eq(&active.slot, &slot) {
                let mut state = slot.lock();
                if state
                    .binding
                    .as_ref()
                    .is_some_and(|binding| binding.drives(&player))
                {
                    state.queue.touch(self.next_touch());
                    debug!("Queue {} is already active", slot.id);
                    return Ok(slot.id.clone());
                }
            }
        }

        let playing = previous
            .as_ref()
            .and_then(|active| active.slot.lock().queue.current_track().cloned());

        let generation = board.next_generation;

        let (cursor, replaced) = {
            let mut state = slot.lock();
            let binding = Binding::bind(
                &mut state.queue,
                Arc::clone(&player),
                generation,
                playing.as_ref(),
                self.config.binding.prefer_playing_track,
                Arc::downgrade(self),
            )?;
            state.queue.touch(self.next_touch());
            (state.queue.cursor(), state.binding.replace(binding))
        };

        board.next_generation += 1;

        // Tear down whatever was bound before; a different player is stopped
        let old_binding = match previous {
            Some(active) if !Arc::ptr_eq(&active.slot, &slot) => active.slot.lock().binding.take(),
            _ => replaced,
        };
        if let Some(old) = old_binding {
            if !old.drives(&player) {
                old.stop_player();
            }
            old.unbind();
        }

        board.active = Some(ActiveBinding {
            slot: Arc::clone(&slot),
            generation,
        });
        drop(board);

        info!(
            "Activated queue '{}' ({}) at index {:?}",
            slot.title, slot.id, cursor
        );
        self.emit(BoardEvent::ActiveQueueChanged {
            id: Some(slot.id.clone()),
        });
        self.emit(BoardEvent::PositionChanged {
            id: slot.id.clone(),
            index: cursor,
        });
        self.persist();

        Ok(slot.id.clone())
    }

    /// Move a track within a queue's canonical order
    pub fn move_item(&self, id: &QueueId, from: usize, to: usize) -> Result<()> {
        self.mutate(id, |queue| {
            queue.move_item(from, to)?;
            Ok(((), from != to))
        })
    }

    /// Remove the track at `position` in a queue's active order
    pub fn remove_at(&self, id: &QueueId, position: usize) -> Result<TrackRef> {
        self.mutate(id, |queue| Ok((queue.remove_at(position)?, true)))
    }

    /// Turn a queue's shuffle view on (or re-roll it) or off
    pub fn toggle_shuffle(&self, id: &QueueId, enable: bool) -> Result<()> {
        self.mutate(id, |queue| {
            let was_shuffled = queue.is_shuffled();
            queue.toggle_shuffle(enable);
            Ok(((), enable || was_shuffled))
        })
    }

    /// Drop every track from a queue but keep the queue itself
    pub fn clear_queue(&self, id: &QueueId) -> Result<()> {
        self.mutate(id, |queue| {
            let had_items = !queue.is_empty();
            queue.clear();
            Ok(((), had_items))
        })
    }

    fn mutate<T>(&self, id: &QueueId, op: impl FnOnce(&mut Queue) -> Result<(T, bool)>) -> Result<T> {
        let slot = self.slot(id)?;
        self.mutate_slot(&slot, op)
    }

    fn mutate_slot<T>(
        &self,
        slot: &QueueSlot,
        op: impl FnOnce(&mut Queue) -> Result<(T, bool)>,
    ) -> Result<T> {
        let guard = slot.lock();
        self.mutate_locked(slot, guard, op)
    }

    /// Apply a structural edit under the slot lock
    ///
    /// A bound queue first takes its cursor from the player, so the edit
    /// remaps the position that is actually playing. `op` returns its value
    /// plus whether the active order changed; if so and the queue is bound,
    /// the new order is pushed to the player.
    fn mutate_locked<T>(
        &self,
        slot: &QueueSlot,
        mut guard: MutexGuard<'_, SlotState>,
        op: impl FnOnce(&mut Queue) -> Result<(T, bool)>,
    ) -> Result<T> {
        let seq = self.next_touch();

        let (value, length, before, after) = {
            let SlotState {
                queue,
                binding,
                retired,
            } = &mut *guard;

            if *retired {
                return Err(QueueError::ConcurrentModification(format!(
                    "queue {} was removed",
                    slot.id
                )));
            }

            let before = queue.cursor();
            if let Some(binding) = binding.as_ref() {
                if let Err(err) = binding.reconcile(queue) {
                    warn!("Could not read player position for queue {}: {}", slot.id, err);
                }
            }

            let (value, changed) = op(queue)?;
            queue.touch(seq);

            if let (true, Some(binding)) = (changed, binding.as_ref()) {
                if let Err(err) = binding.sync(queue) {
                    warn!("Failed to push queue {} to the player: {}", slot.id, err);
                }
            }

            (value, queue.len(), before, queue.cursor())
        };
        drop(guard);

        self.emit(BoardEvent::QueueUpdated {
            id: slot.id.clone(),
            length,
        });
        if before != after {
            self.emit(BoardEvent::PositionChanged {
                id: slot.id.clone(),
                index: after,
            });
        }
        self.persist();

        Ok(value)
    }

    /// The player moved on to `index` of the active queue's order
    ///
    /// For embedders that forward progress themselves; `index` is taken as
    /// given and must refer to the order last pushed to the player.
    pub fn on_player_advance(&self, index: usize) -> Result<()> {
        let generation = self.active_generation()?;
        self.update_cursor(generation, |_, queue| queue.set_cursor(index))
    }

    /// The user jumped to `index` of the active queue's order
    pub fn on_player_seek(&self, index: usize) -> Result<()> {
        let generation = self.active_generation()?;
        self.update_cursor(generation, |_, queue| queue.set_cursor(index))
    }

    /// The player shut down; the active queue is unbound
    pub fn on_player_released(&self) -> Result<()> {
        let generation = self.active_generation()?;
        self.apply_player_event(generation, PlayerEvent::Released)
    }

    fn active_generation(&self) -> Result<u64> {
        self.lock_state()
            .active
            .as_ref()
            .map(|active| active.generation)
            .ok_or_else(|| QueueError::PlayerUnavailable("no queue is bound".to_string()))
    }

    /// Apply an event from the binding with `generation`
    ///
    /// Fails with `ConcurrentModification` once that binding has been
    /// replaced or torn down. Advance/seek events may have been queued
    /// before the last re-sync, so the cursor follows the player's live index.
    pub(crate) fn apply_player_event(&self, generation: u64, event: PlayerEvent) -> Result<()> {
        match event {
            PlayerEvent::Advanced { index } | PlayerEvent::Seeked { index } => {
                self.update_cursor(generation, |binding, queue| binding.follow(queue, index))
            }
            PlayerEvent::Released => self.release_binding(generation),
        }
    }

    /// Re-read the player's position after missed events
    pub(crate) fn reconcile_binding(&self, generation: u64) -> Result<()> {
        self.update_cursor(generation, Binding::reconcile)
    }

    fn update_cursor(
        &self,
        generation: u64,
        update: impl FnOnce(&Binding, &mut Queue) -> Result<()>,
    ) -> Result<()> {
        let slot = {
            let board = self.lock_state();
            match &board.active {
                Some(active) if active.generation == generation => Arc::clone(&active.slot),
                _ => return Err(stale_binding(generation)),
            }
        };

        let (before, after) = {
            let mut guard = slot.lock();
            let SlotState { queue, binding, .. } = &mut *guard;
            let binding = binding
                .as_ref()
                .filter(|binding| binding.generation() == generation)
                .ok_or_else(|| stale_binding(generation))?;

            let before = queue.cursor();
            update(binding, queue)?;
            (before, queue.cursor())
        };

        if before != after {
            self.emit(BoardEvent::PositionChanged {
                id: slot.id.clone(),
                index: after,
            });
            self.persist();
        }
        Ok(())
    }

    fn release_binding(&self, generation: u64) -> Result<()> {
        let mut board = self.lock_state();
        let active = match board.active.take() {
            Some(active) if active.generation == generation => active,
            other => {
                board.active = other;
                return Err(stale_binding(generation));
            }
        };

        if let Some(binding) = active.slot.lock().binding.take() {
            binding.unbind();
        }
        drop(board);

        info!("Player released; queue {} unbound", active.slot.id);
        self.emit(BoardEvent::ActiveQueueChanged { id: None });
        self.persist();
        Ok(())
    }

    /// Persistable copy of the whole board
    pub fn to_record(&self) -> BoardRecord {
        let board = self.lock_state();
        BoardRecord {
            queues: board
                .slots
                .iter()
                .map(|slot| slot.lock().queue.to_record())
                .collect(),
            active_queue_id: board.active.as_ref().map(|active| active.slot.id.clone()),
        }
    }

    /// Write the latest state now and wait for the store
    pub async fn flush(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.save(self.to_record());
            persistence.flush().await;
        }
    }
}

impl Drop for QueueBoard {
    fn drop(&mut self) {
        let board = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for slot in &board.slots {
            if let Some(binding) = slot.lock().binding.take() {
                binding.unbind();
            }
        }
    }
}

fn stale_binding(generation: u64) -> QueueError {
    QueueError::ConcurrentModification(format!(
        "player binding {} is no longer active",
        generation
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::MemoryPlayer;

    fn track(id: &str) -> TrackRef {
        TrackRef::new(id, format!("Song {}", id)).with_duration_secs(60)
    }

    fn tracks(ids: &[&str]) -> Vec<TrackRef> {
        ids.iter().map(|id| track(id)).collect()
    }

    fn ids(tracks: &[TrackRef]) -> Vec<String> {
        tracks.iter().map(|t| t.id().to_string()).collect()
    }

    fn board() -> Arc<QueueBoard> {
        Arc::new(QueueBoard::new(BoardConfig::default()))
    }

    #[test]
    fn add_creates_then_merges() {
        let board = board();
        let id = board.add("Party", tracks(&["a", "b"]), false, true).unwrap();
        let same = board.add("Party", tracks(&["b", "c"]), false, true).unwrap();

        assert_eq!(id, same);
        assert_eq!(board.len(), 1);
        assert_eq!(ids(&board.get_queue(&id).unwrap().canonical), ["a", "b", "c"]);
    }

    #[test]
    fn new_queue_ignores_delta_flag() {
        let board = board();
        let id = board.add("Q", tracks(&["a", "a"]), false, true).unwrap();
        assert_eq!(ids(&board.get_queue(&id).unwrap().canonical), ["a", "a"]);
    }

    #[test]
    fn listing_is_most_recent_first() {
        let board = board();
        let first = board.add("One", tracks(&["a"]), false, false).unwrap();
        board.add("Two", tracks(&["b"]), false, false).unwrap();
        board.add("One", tracks(&["c"]), false, true).unwrap();

        let titles: Vec<String> = board
            .get_all_queues()
            .into_iter()
            .map(|summary| summary.title)
            .collect();
        assert_eq!(titles, ["One", "Two"]);
        assert_eq!(board.find_by_title("One"), Some(first));
    }

    #[test]
    fn unknown_queue_is_not_found() {
        let board = board();
        let missing = QueueId::new("missing");

        assert!(matches!(board.get_queue(&missing), Err(QueueError::NotFound(_))));
        assert!(matches!(board.remove_queue(&missing), Err(QueueError::NotFound(_))));
        assert!(matches!(
            board.move_item(&missing, 0, 1),
            Err(QueueError::NotFound(_))
        ));
    }

    #[test]
    fn edit_through_removed_slot_is_concurrent_modification() {
        let board = board();
        let id = board.add("Q", tracks(&["a", "b"]), false, false).unwrap();
        let slot = board.slot(&id).unwrap();
        board.remove_queue(&id).unwrap();

        let err = board
            .mutate_slot(&slot, |queue| {
                queue.clear();
                Ok(((), true))
            })
            .unwrap_err();

        assert!(matches!(err, QueueError::ConcurrentModification(_)));
        assert_eq!(ids(slot.lock().queue.canonical()), ["a", "b"]);
        assert!(matches!(board.clear_queue(&id), Err(QueueError::NotFound(_))));
    }

    #[test]
    fn add_racing_remove_always_lands() {
        let board = board();

        for round in 0..200 {
            std::thread::scope(|scope| {
                let adder = scope.spawn(|| board.add("Q", tracks(&["a"]), false, true));
                scope.spawn(|| {
                    if let Some(id) = board.find_by_title("Q") {
                        let _ = board.remove_queue(&id);
                    }
                });

                if let Err(err) = adder.join().unwrap() {
                    panic!("add failed in round {}: {}", round, err);
                }
            });
        }
    }

    #[test]
    fn activation_without_runtime_fails_cleanly() {
        let board = board();
        board.add("Q", tracks(&["a"]), false, false).unwrap();
        let player = Arc::new(MemoryPlayer::new());

        let err = board.set_curr_queue(None, player.clone()).unwrap_err();

        assert!(matches!(err, QueueError::PlayerUnavailable(_)));
        assert_eq!(board.current_queue_id(), None);
        assert_eq!(player.load_count(), 0);
    }

    #[tokio::test]
    async fn stale_generation_is_rejected() {
        let board = board();
        board.add("A", tracks(&["a", "b"]), false, false).unwrap();
        board.add("B", tracks(&["c", "d"]), false, false).unwrap();
        let player = Arc::new(MemoryPlayer::new());

        board.set_curr_queue(Some("A".into()), player.clone()).unwrap();
        let old_generation = board.active_generation().unwrap();
        board.set_curr_queue(Some("B".into()), player.clone()).unwrap();

        let err = board
            .apply_player_event(old_generation, PlayerEvent::Advanced { index: 1 })
            .unwrap_err();
        assert!(matches!(err, QueueError::ConcurrentModification(_)));
    }

    #[tokio::test]
    async fn release_unbinds_active_queue() {
        let board = board();
        let id = board.add("A", tracks(&["a", "b"]), false, false).unwrap();
        let player = Arc::new(MemoryPlayer::new());
        board.set_curr_queue(None, player.clone()).unwrap();
        let mut events = board.subscribe();

        board.on_player_released().unwrap();

        assert_eq!(board.current_queue_id(), None);
        assert_eq!(
            events.recv().await.unwrap(),
            BoardEvent::ActiveQueueChanged { id: None }
        );
        assert!(board.get_queue(&id).is_ok());
        assert!(matches!(
            board.on_player_advance(0),
            Err(QueueError::PlayerUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn record_restores_active_as_most_recent() {
        let board = board();
        let a = board.add("A", tracks(&["a"]), false, false).unwrap();
        board.add("B", tracks(&["b"]), false, false).unwrap();
        let player = Arc::new(MemoryPlayer::new());
        board.set_curr_queue(Some(QueueRef::Id(a.clone())), player).unwrap();
        board.add("B", tracks(&["c"]), false, true).unwrap();

        let record = board.to_record();
        assert_eq!(record.active_queue_id.as_ref(), Some(&a));

        let restored = QueueBoard::from_record(BoardConfig::default(), record, None);
        assert_eq!(restored.current_queue_id(), None);
        assert_eq!(restored.get_all_queues()[0].id, a);
    }
}
