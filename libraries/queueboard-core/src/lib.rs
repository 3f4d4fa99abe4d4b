//! Queueboard Core
//!
//! Platform-agnostic types, the persistence contract, and error handling shared
//! by the Queueboard crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `TrackRef`, `QueueId`, `TrackId`, `ArtworkRef`
//! - **Persistence Records**: `QueueRecord`, `BoardRecord`
//! - **Core Traits**: `QueueStore` (opaque save/load collaborator)
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use queueboard_core::types::{ArtworkRef, TrackRef};
//!
//! let track = TrackRef::new("trk-1", "Intro")
//!     .with_artists(["The Band"])
//!     .with_duration_secs(215)
//!     .with_artwork(ArtworkRef::new("covers/intro.jpg"));
//!
//! assert_eq!(track.id().as_str(), "trk-1");
//! assert_eq!(track.duration_secs(), 215);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use storage::QueueStore;
pub use types::{ArtworkRef, BoardRecord, QueueId, QueueRecord, TrackId, TrackRef};
