//! Queueboard Storage
//!
//! Implementations of [`queueboard_core::QueueStore`]:
//! - [`SqliteQueueStore`]: `SQLite` database, one row per queue
//! - [`MemoryQueueStore`]: process-local, for tests and ephemeral sessions
//!
//! # Example
//!
//! ```rust,no_run
//! use queueboard_core::QueueStore;
//! use queueboard_storage::SqliteQueueStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteQueueStore::connect("sqlite://./data/queues.db").await?;
//!
//! let board = store.load().await?;
//! println!("{} saved queues", board.queues.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
pub mod queues;

pub use error::{Result, StorageError};
pub use memory::MemoryQueueStore;
pub use queues::SqliteQueueStore;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup, before the first save or load.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://queues.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> std::result::Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!("Creating queue store pool for {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}
