/// In-memory queue store
use async_trait::async_trait;
use queueboard_core::{BoardRecord, QueueStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Keeps the last saved board in process memory
///
/// Nothing survives a restart. Counts saves so callers can observe
/// debouncing.
#[derive(Debug, Default)]
pub struct MemoryQueueStore {
    board: Mutex<BoardRecord>,
    saves: AtomicUsize,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing board, as if it had been saved earlier
    pub fn with_board(board: BoardRecord) -> Self {
        Self {
            board: Mutex::new(board),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn save(&self, board: BoardRecord) -> queueboard_core::Result<()> {
        *self.board.lock().unwrap_or_else(PoisonError::into_inner) = board;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load(&self) -> queueboard_core::Result<BoardRecord> {
        Ok(self
            .board
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
