//! Fire-and-forget persistence
//!
//! The board never awaits storage. Every mutation hands a full snapshot to a
//! background task which coalesces bursts (only the newest snapshot within
//! the debounce window is written) and logs failures.

use crate::error::{QueueError, Result};
use queueboard_core::{BoardRecord, CoreError, QueueStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

enum PersistCommand {
    Save(BoardRecord),
    Flush(oneshot::Sender<()>),
}

/// Sender side of the persistence worker
#[derive(Debug, Clone)]
pub struct PersistenceHandle {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistenceHandle {
    /// Start the worker on the current Tokio runtime
    ///
    /// The worker stops once every handle has been dropped, after writing
    /// whatever snapshot is still pending.
    pub fn spawn(store: Arc<dyn QueueStore>, debounce: Duration) -> Result<(Self, JoinHandle<()>)> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            QueueError::Core(CoreError::storage(
                "persistence requires a running Tokio runtime",
            ))
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let task = runtime.spawn(run_worker(store, debounce, rx));
        Ok((Self { tx }, task))
    }

    /// Queue a snapshot for saving; never blocks
    pub fn save(&self, record: BoardRecord) {
        if self.tx.send(PersistCommand::Save(record)).is_err() {
            debug!("Persistence worker stopped; snapshot dropped");
        }
    }

    /// Write any pending snapshot now and wait until it is stored
    pub async fn flush(&self) {
        let (reply, done) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(reply)).is_err() {
            return;
        }
        let _ = done.await;
    }
}

async fn run_worker(
    store: Arc<dyn QueueStore>,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<PersistCommand>,
) {
    let mut pending: Option<(BoardRecord, Instant)> = None;

    loop {
        let command = match pending.as_ref().map(|(_, deadline)| *deadline) {
            Some(deadline) => match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(command) => command,
                Err(_) => {
                    if let Some((record, _)) = pending.take() {
                        save(store.as_ref(), record).await;
                    }
                    continue;
                }
            },
            None => rx.recv().await,
        };

        match command {
            Some(PersistCommand::Save(record)) => {
                // Keep the original deadline so a steady stream of edits still gets written
                let deadline = pending
                    .take()
                    .map_or_else(|| Instant::now() + debounce, |(_, deadline)| deadline);
                pending = Some((record, deadline));
            }
            Some(PersistCommand::Flush(reply)) => {
                if let Some((record, _)) = pending.take() {
                    save(store.as_ref(), record).await;
                }
                let _ = reply.send(());
            }
            None => {
                if let Some((record, _)) = pending.take() {
                    save(store.as_ref(), record).await;
                }
                break;
            }
        }
    }

    debug!("Persistence worker stopped");
}

async fn save(store: &dyn QueueStore, record: BoardRecord) {
    let count = record.queues.len();
    match store.save(record).await {
        Ok(()) => debug!("Saved {} queues", count),
        Err(err) => warn!("Failed to save queue board: {}", err),
    }
}
