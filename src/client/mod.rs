//! Collaborator clients for the messaging platform.
//!
//! The pipeline only ever talks to [`TelegramApi`]. Two implementations ship
//! with the crate:
//! - [`MemoryClient`] - scripted, in-memory; supports failure injection
//! - [`SnapshotClient`] - offline, backed by a snapshot directory of
//!   Telegram Desktop exports (requires the `snapshot` feature)
//!
//! # Snapshot layout
//!
//! ```text
//! <dir>/snapshot.json            entities, invites, participants, sticker sets
//! <dir>/messages/<entity_id>.json   Telegram Desktop export of one chat
//! ```

mod error;
mod memory;
#[cfg(feature = "snapshot")]
mod snapshot;
mod traits;

pub use error::{ApiError, ApiResult};
pub use memory::{MemoryClient, MemoryClientBuilder};
#[cfg(feature = "snapshot")]
pub use snapshot::{SnapshotClient, SnapshotConfig};
pub use traits::{MessageStream, TelegramApi};
