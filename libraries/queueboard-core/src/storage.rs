//! Persistence contract for the queue board

use crate::error::Result;
use crate::types::BoardRecord;
use async_trait::async_trait;

/// Opaque save/load collaborator
///
/// The board hands a complete snapshot to `save` and expects `load` to
/// return the last snapshot saved (or an empty board). How the snapshot is
/// laid out on disk is up to the implementation.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Replace the stored board with `board`
    async fn save(&self, board: BoardRecord) -> Result<()>;

    /// Load the last saved board; an empty board if nothing was saved yet
    async fn load(&self) -> Result<BoardRecord>;
}
