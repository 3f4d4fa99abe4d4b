//! Queueboard - Multi-Queue Playback Management
//!
//! Keeps any number of named play queues and binds one of them at a time to
//! a player.
//!
//! This crate provides:
//! - Named queues with a canonical order and an optional shuffle view
//! - Delta merges with id dedup, or forced repeats
//! - A registry with most-recently-used ordering and title lookup
//! - Activation that hands the queue to the player and keeps its cursor live
//! - Board change events and debounced, fire-and-forget persistence
//!
//! # Architecture
//!
//! `queueboard-playback` never decodes audio and never talks to a database:
//! - The playback engine is reached through the [`Player`] trait
//! - Storage is reached through [`queueboard_core::QueueStore`]
//!
//! # Example
//!
//! ```rust
//! use queueboard_core::TrackRef;
//! use queueboard_playback::{BoardConfig, MemoryPlayer, Player, QueueBoard};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> queueboard_playback::Result<()> {
//! let board = Arc::new(QueueBoard::new(BoardConfig::default()));
//!
//! let songs = vec![
//!     TrackRef::new("s1", "Opening"),
//!     TrackRef::new("s2", "Middle"),
//!     TrackRef::new("s3", "Closing"),
//! ];
//! board.add("Party", songs, true, false)?;
//!
//! let player = Arc::new(MemoryPlayer::new());
//! board.set_curr_queue(Some("Party".into()), player.clone())?;
//!
//! assert_eq!(player.items().len(), 3);
//! assert_eq!(player.current_index(), Some(0));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod binding;
pub mod board;
pub mod config;
pub mod error;
pub mod events;
pub mod persistence;
pub mod player;
pub mod queue;
pub mod shuffle;
pub mod types;

pub use board::QueueBoard;
pub use config::{BindingSettings, BoardConfig, PersistenceSettings};
pub use error::{QueueError, Result};
pub use events::{BoardEvent, PlayerEvent};
pub use persistence::PersistenceHandle;
pub use player::{MemoryPlayer, Player, PlayerError};
pub use queue::Queue;
pub use types::{QueueRef, QueueSnapshot, QueueSummary};
