//! A single named play queue
//!
//! Structure:
//! ```text
//! canonical:  [A, B, C, D, E]      insertion order, authoritative
//! shuffle:    [2, 0, 4, 1, 3]      optional view: indices into canonical
//! active:     [C, A, E, B, D]      what playback follows
//! cursor:      ^ 0                 index into the active order
//! ```
//!
//! The queue itself is not synchronized. The board keeps every queue behind
//! its own mutex so structural edits and player cursor updates are applied
//! one at a time.

use crate::error::{QueueError, Result};
use crate::shuffle;
use crate::types::{QueueSnapshot, QueueSummary};
use chrono::{DateTime, Utc};
use queueboard_core::{QueueId, QueueRecord, TrackId, TrackRef};
use rand::Rng;
use std::cell::OnceCell;
use std::collections::HashSet;
use tracing::warn;

/// One named, ordered collection of tracks with an optional shuffle view
#[derive(Debug, Clone)]
pub struct Queue {
    id: QueueId,
    title: String,

    /// Authoritative insertion order; may hold the same track twice
    canonical: Vec<TrackRef>,

    /// Permutation of canonical indices while shuffle is enabled
    shuffle: Option<Vec<usize>>,

    /// Index into the active order, `None` when empty or never played
    cursor: Option<usize>,

    created_at: DateTime<Utc>,
    touched_at: DateTime<Utc>,
    touch_seq: u64,

    /// Sum of canonical durations, recomputed lazily after mutations
    duration: OnceCell<u64>,
}

impl Queue {
    /// Create a new empty queue
    pub fn new(title: impl Into<String>, touch_seq: u64) -> Self {
        let now = Utc::now();
        Self {
            id: QueueId::generate(),
            title: title.into(),
            canonical: Vec::new(),
            shuffle: None,
            cursor: None,
            created_at: now,
            touched_at: now,
            touch_seq,
            duration: OnceCell::new(),
        }
    }

    /// Rebuild a queue from persisted state
    ///
    /// Records come from outside the process, so a shuffle order that is not
    /// a permutation or a cursor past the end is dropped rather than trusted.
    pub fn from_record(record: QueueRecord) -> Self {
        let len = record.tracks.len();

        let shuffle = match record.shuffle_order {
            Some(order) if len > 0 && shuffle::is_permutation(&order, len) => Some(order),
            Some(_) if len > 0 => {
                warn!(
                    "Dropping invalid shuffle order for queue {} ({})",
                    record.id, record.title
                );
                None
            }
            _ => None,
        };

        let cursor = match record.cursor {
            Some(index) if index < len => Some(index),
            Some(index) => {
                warn!(
                    "Dropping out-of-range cursor {} for queue {} ({} tracks)",
                    index, record.id, len
                );
                None
            }
            None => None,
        };

        Self {
            id: record.id,
            title: record.title,
            canonical: record.tracks,
            shuffle,
            cursor,
            created_at: record.created_at,
            touched_at: record.touched_at,
            touch_seq: record.touch_seq,
            duration: OnceCell::new(),
        }
    }

    /// Persistable copy of this queue
    pub fn to_record(&self) -> QueueRecord {
        QueueRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            tracks: self.canonical.clone(),
            shuffle_order: self.shuffle.clone(),
            cursor: self.cursor,
            created_at: self.created_at,
            touched_at: self.touched_at,
            touch_seq: self.touch_seq,
        }
    }

    pub fn id(&self) -> &QueueId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of tracks (same for canonical and shuffled views)
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffle.is_some()
    }

    /// Index of the playing item in the active order
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn touched_at(&self) -> DateTime<Utc> {
        self.touched_at
    }

    /// Recency rank; larger means touched more recently
    pub fn touch_seq(&self) -> u64 {
        self.touch_seq
    }

    /// Mark the queue as just used
    pub fn touch(&mut self, seq: u64) {
        self.touched_at = Utc::now();
        self.touch_seq = seq;
    }

    /// Tracks in insertion order
    pub fn canonical(&self) -> &[TrackRef] {
        &self.canonical
    }

    /// The order playback follows: the shuffle view if enabled, else canonical
    ///
    /// A pure read. Calling it twice without a mutation in between returns
    /// the same sequence.
    pub fn current_order(&self) -> Vec<TrackRef> {
        match &self.shuffle {
            Some(order) => order.iter().map(|&i| self.canonical[i].clone()).collect(),
            None => self.canonical.clone(),
        }
    }

    /// Canonical index of the item at `position` in the active order
    pub fn canonical_index(&self, position: usize) -> Option<usize> {
        match &self.shuffle {
            Some(order) => order.get(position).copied(),
            None => (position < self.canonical.len()).then_some(position),
        }
    }

    /// Track at `position` in the active order
    pub fn track_at(&self, position: usize) -> Option<&TrackRef> {
        self.canonical_index(position)
            .and_then(|index| self.canonical.get(index))
    }

    /// Track under the cursor
    pub fn current_track(&self) -> Option<&TrackRef> {
        self.cursor.and_then(|position| self.track_at(position))
    }

    /// First position of `id` in the active order
    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        (0..self.len()).find(|&position| {
            self.track_at(position)
                .is_some_and(|track| track.id() == id)
        })
    }

    /// Add tracks using the registry's merge rules
    ///
    /// - `delta = false`: replace the canonical order with `items`
    /// - `delta = true, force_insert = false`: append items whose id is not
    ///   already in the queue (duplicates inside `items` are kept)
    /// - `delta = true, force_insert = true`: append everything
    ///
    /// Returns the number of tracks inserted.
    pub fn add(&mut self, items: Vec<TrackRef>, force_insert: bool, delta: bool) -> usize {
        self.add_with_rng(items, force_insert, delta, &mut rand::thread_rng())
    }

    pub fn add_with_rng<R: Rng + ?Sized>(
        &mut self,
        items: Vec<TrackRef>,
        force_insert: bool,
        delta: bool,
        rng: &mut R,
    ) -> usize {
        let inserted = if delta {
            self.append(items, force_insert, rng)
        } else {
            self.replace(items, rng)
        };

        self.invalidate();
        inserted
    }

    fn replace<R: Rng + ?Sized>(&mut self, items: Vec<TrackRef>, rng: &mut R) -> usize {
        let playing = self.current_track().cloned();
        let had_cursor = self.cursor.is_some();
        let was_shuffled = self.shuffle.is_some();

        let inserted = items.len();
        self.canonical = items;

        if self.canonical.is_empty() {
            self.shuffle = None;
            self.cursor = None;
            return 0;
        }

        let pinned = playing
            .as_ref()
            .and_then(|track| self.canonical.iter().position(|t| t == track));

        if was_shuffled {
            self.shuffle = Some(shuffle::pinned_permutation(
                self.canonical.len(),
                pinned,
                rng,
            ));
            self.cursor = match pinned {
                Some(_) => Some(0),
                None => had_cursor.then_some(0),
            };
        } else {
            self.cursor = pinned.or_else(|| had_cursor.then_some(0));
        }

        inserted
    }

    fn append<R: Rng + ?Sized>(
        &mut self,
        items: Vec<TrackRef>,
        force_insert: bool,
        rng: &mut R,
    ) -> usize {
        let accepted: Vec<TrackRef> = if force_insert {
            items
        } else {
            let existing: HashSet<&TrackId> = self.canonical.iter().map(TrackRef::id).collect();
            items
                .into_iter()
                .filter(|track| !existing.contains(track.id()))
                .collect()
        };

        let start = self.canonical.len();
        let inserted = accepted.len();
        self.canonical.extend(accepted);

        if let Some(order) = self.shuffle.as_mut() {
            shuffle::scatter_upcoming(order, start..start + inserted, self.cursor, rng);
        }

        inserted
    }

    /// Enable (or re-roll) or disable the shuffle view
    ///
    /// Enabling pins the current track to the front of the new permutation
    /// and moves the cursor to 0. Disabling maps the cursor back to the
    /// canonical position of the current track.
    pub fn toggle_shuffle(&mut self, enable: bool) {
        self.toggle_shuffle_with_rng(enable, &mut rand::thread_rng());
    }

    pub fn toggle_shuffle_with_rng<R: Rng + ?Sized>(&mut self, enable: bool, rng: &mut R) {
        if enable {
            if self.canonical.is_empty() {
                return;
            }

            let pinned = self.cursor.and_then(|position| self.canonical_index(position));
            self.shuffle = Some(shuffle::pinned_permutation(
                self.canonical.len(),
                pinned,
                rng,
            ));
            if pinned.is_some() {
                self.cursor = Some(0);
            }
        } else if let Some(order) = self.shuffle.take() {
            self.cursor = self.cursor.and_then(|position| order.get(position).copied());
        }

        self.check_invariants();
    }

    /// Move a track within the canonical order
    ///
    /// Shuffle entries keep pointing at the same tracks. Fails without
    /// touching anything if either index is out of range.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.canonical.len();
        for index in [from, to] {
            if index >= len {
                return Err(QueueError::IndexOutOfRange { index, len });
            }
        }

        if from == to {
            return Ok(());
        }

        let track = self.canonical.remove(from);
        self.canonical.insert(to, track);

        match self.shuffle.as_mut() {
            Some(order) => {
                for entry in order.iter_mut() {
                    *entry = shuffle::index_after_move(*entry, from, to);
                }
            }
            None => {
                self.cursor = self
                    .cursor
                    .map(|position| shuffle::index_after_move(position, from, to));
            }
        }

        self.invalidate();
        Ok(())
    }

    /// Remove the item at `position` in the active order
    ///
    /// If the removed item was under the cursor, the cursor stays on the same
    /// position (now the next surviving item; the last item when the tail was
    /// removed) and becomes `None` once the queue is empty.
    pub fn remove_at(&mut self, position: usize) -> Result<TrackRef> {
        let len = self.canonical.len();
        let index = self
            .canonical_index(position)
            .ok_or(QueueError::IndexOutOfRange { index: position, len })?;

        let removed = self.canonical.remove(index);

        if let Some(order) = self.shuffle.as_mut() {
            order.remove(position);
            for entry in order.iter_mut() {
                if *entry > index {
                    *entry -= 1;
                }
            }
        }

        let remaining = self.canonical.len();
        self.cursor = match self.cursor {
            _ if remaining == 0 => None,
            Some(cursor) if cursor > position => Some(cursor - 1),
            Some(cursor) if cursor == position => Some(cursor.min(remaining - 1)),
            other => other,
        };

        if remaining == 0 {
            self.shuffle = None;
        }

        self.invalidate();
        Ok(removed)
    }

    /// Drop every track and return to the empty state
    pub fn clear(&mut self) {
        self.canonical.clear();
        self.shuffle = None;
        self.cursor = None;
        self.invalidate();
    }

    /// Point the cursor at `position` in the active order
    pub fn set_cursor(&mut self, position: usize) -> Result<()> {
        let len = self.canonical.len();
        if position >= len {
            return Err(QueueError::IndexOutOfRange {
                index: position,
                len,
            });
        }
        self.cursor = Some(position);
        Ok(())
    }

    /// Total duration of all tracks in seconds
    pub fn duration_secs(&self) -> u64 {
        *self
            .duration
            .get_or_init(|| self.canonical.iter().map(TrackRef::duration_secs).sum())
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            id: self.id.clone(),
            title: self.title.clone(),
            canonical: self.canonical.clone(),
            current_order: self.current_order(),
            shuffled: self.is_shuffled(),
            cursor: self.cursor,
            duration_secs: self.duration_secs(),
            created_at: self.created_at,
            touched_at: self.touched_at,
        }
    }

    pub fn summary(&self, active: bool) -> QueueSummary {
        QueueSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            item_count: self.len(),
            duration_secs: self.duration_secs(),
            shuffled: self.is_shuffled(),
            active,
            created_at: self.created_at,
            touched_at: self.touched_at,
        }
    }

    fn invalidate(&mut self) {
        self.duration.take();
        self.check_invariants();
    }

    fn check_invariants(&self) {
        if let Some(order) = &self.shuffle {
            debug_assert!(
                shuffle::is_permutation(order, self.canonical.len()),
                "shuffle order {:?} is not a permutation of 0..{}",
                order,
                self.canonical.len()
            );
        }
        if let Some(cursor) = self.cursor {
            debug_assert!(
                cursor < self.canonical.len(),
                "cursor {} out of range for {} tracks",
                cursor,
                self.canonical.len()
            );
        }
    }
}
