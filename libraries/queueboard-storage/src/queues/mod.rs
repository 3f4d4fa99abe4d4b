//! SQLite-backed queue board store
//!
//! Each queue is one row in `play_queues`; its tracks and shuffle order are
//! JSON columns since they are only ever read and written as a whole. The
//! active queue id lives in the single-row `queue_board_state` table.
//!
//! A save replaces the whole board inside one transaction, so a crash
//! mid-save leaves the previous snapshot intact.

use crate::error::{Result, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use queueboard_core::{BoardRecord, QueueId, QueueRecord, QueueStore, TrackRef};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::debug;

const QUEUES_TABLE: &str = "play_queues";

/// Queue store backed by a `SQLite` pool
#[derive(Debug, Clone)]
pub struct SqliteQueueStore {
    pool: SqlitePool,
}

impl SqliteQueueStore {
    /// Wrap a pool that already has migrations applied
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database at `database_url` and migrate it
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = crate::create_pool(database_url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        crate::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Replace the stored board with `board`
    pub async fn save_board(&self, board: &BoardRecord) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM play_queues")
            .execute(&mut *tx)
            .await?;

        for (position, queue) in board.queues.iter().enumerate() {
            let tracks_json = serde_json::to_string(&queue.tracks)?;
            let shuffle_json = queue
                .shuffle_order
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;

            sqlx::query(
                "INSERT INTO play_queues
                    (id, position, title, tracks_json, shuffle_order_json, cursor_position,
                     created_at, touched_at, touch_seq)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(queue.id.as_str())
            .bind(position as i64)
            .bind(&queue.title)
            .bind(tracks_json)
            .bind(shuffle_json)
            .bind(queue.cursor.map(|c| c as i64))
            .bind(queue.created_at.timestamp_millis())
            .bind(queue.touched_at.timestamp_millis())
            .bind(queue.touch_seq as i64)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO queue_board_state (id, active_queue_id) VALUES (1, ?)
             ON CONFLICT(id) DO UPDATE SET active_queue_id = excluded.active_queue_id",
        )
        .bind(board.active_queue_id.as_ref().map(QueueId::as_str))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!("Saved {} queues to SQLite", board.queues.len());
        Ok(())
    }

    /// Load the stored board; empty if nothing was saved yet
    pub async fn load_board(&self) -> Result<BoardRecord> {
        let rows = sqlx::query(
            "SELECT id, title, tracks_json, shuffle_order_json, cursor_position,
                    created_at, touched_at, touch_seq
             FROM play_queues
             ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        let queues = rows
            .iter()
            .map(queue_from_row)
            .collect::<Result<Vec<_>>>()?;

        let active_queue_id = sqlx::query_scalar::<_, Option<String>>(
            "SELECT active_queue_id FROM queue_board_state WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?
        .flatten()
        .map(QueueId::new);

        Ok(BoardRecord {
            queues,
            active_queue_id,
        })
    }
}

fn queue_from_row(row: &SqliteRow) -> Result<QueueRecord> {
    let id: String = row.try_get("id")?;

    let tracks: Vec<TrackRef> = serde_json::from_str(&row.try_get::<String, _>("tracks_json")?)?;
    let shuffle_order = row
        .try_get::<Option<String>, _>("shuffle_order_json")?
        .map(|json| serde_json::from_str::<Vec<usize>>(&json))
        .transpose()?;

    let cursor = row
        .try_get::<Option<i64>, _>("cursor_position")?
        .map(|c| {
            usize::try_from(c)
                .map_err(|_| StorageError::corrupt(QUEUES_TABLE, format!("negative cursor for {}", id)))
        })
        .transpose()?;

    Ok(QueueRecord {
        title: row.try_get("title")?,
        tracks,
        shuffle_order,
        cursor,
        created_at: timestamp(&id, row.try_get("created_at")?)?,
        touched_at: timestamp(&id, row.try_get("touched_at")?)?,
        touch_seq: row.try_get::<i64, _>("touch_seq")? as u64,
        id: QueueId::new(id),
    })
}

fn timestamp(id: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        StorageError::corrupt(QUEUES_TABLE, format!("invalid timestamp {} for {}", millis, id))
    })
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn save(&self, board: BoardRecord) -> queueboard_core::Result<()> {
        Ok(self.save_board(&board).await?)
    }

    async fn load(&self) -> queueboard_core::Result<BoardRecord> {
        Ok(self.load_board().await?)
    }
}
