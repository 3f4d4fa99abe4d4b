mod ids;
mod record;
mod track;

pub use ids::{QueueId, TrackId};
pub use record::{BoardRecord, QueueRecord};
pub use track::{ArtworkRef, TrackRef};
