//! Shared fixtures for queue board integration tests

#![allow(dead_code)]

use queueboard_core::TrackRef;
use queueboard_playback::{BoardConfig, QueueBoard};
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn track(id: &str) -> TrackRef {
    TrackRef::new(id, format!("Song {}", id)).with_duration_secs(200)
}

pub fn tracks(ids: &[&str]) -> Vec<TrackRef> {
    ids.iter().map(|id| track(id)).collect()
}

pub fn ids(tracks: &[TrackRef]) -> Vec<String> {
    tracks.iter().map(|t| t.id().to_string()).collect()
}

pub fn new_board() -> Arc<QueueBoard> {
    init_tracing();
    Arc::new(QueueBoard::new(BoardConfig::default()))
}

/// Poll `condition` until it holds or two seconds pass
///
/// Player events reach the board through a spawned task, so assertions on
/// the cursor have to wait for it.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
