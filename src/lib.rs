//! # TGSpyder
//!
//! Telegram OSINT pipeline: resolve a chat, snapshot its members, crawl its
//! history into a transcript, harvest the private invite links it mentions,
//! infer who created a sticker pack, and look up user profiles.
//!
//! ## Overview
//!
//! The pipeline never talks to the network itself. Every remote call goes
//! through the [`TelegramApi`](client::TelegramApi) trait, and two
//! implementations ship with the crate:
//! - [`MemoryClient`](client::MemoryClient) - scripted, in memory
//! - [`SnapshotClient`](client::SnapshotClient) - offline, backed by a
//!   directory of Telegram Desktop exports (feature `snapshot`)
//!
//! Results land as CSV files under a fixed layout:
//!
//! ```text
//! TGSpyder Output/members/members_<name>_<YYYYMMDD_HHMMSS>.csv
//! TGSpyder Output/chats/messages_<name>_<YYYYMMDD_HHMMSS>.csv
//! TGSpyder Output/crawled_links/crawled_links_<name>_<YYYYMMDD_HHMMSS>.csv
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tgspyder::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let client = SnapshotClient::open("snapshot")?;
//!     let layout = OutputLayout::from_config(&SpyderConfig::default());
//!
//!     let entity = resolve_target(&client, "https://t.me/+AbC123")?;
//!     enumerate_members(&client, &entity, &layout, &no_progress())?;
//!
//!     let report = crawl_history(&client, &entity, &layout, CrawlOptions::all(), &no_progress())?;
//!     println!("{} messages, {} invite links", report.messages_seen, report.invites_found);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`core`] - the pipeline
//!   - [`core::resolver`] - [`resolve_target`](core::resolve_target)
//!   - [`core::members`] - [`enumerate_members`](core::enumerate_members)
//!   - [`core::crawler`] - [`crawl_history`](core::crawl_history), [`CrawlReport`](core::CrawlReport)
//!   - [`core::stickers`] - [`resolve_sticker_pack`](core::resolve_sticker_pack)
//!   - [`core::lookup`] - [`lookup_user`](core::lookup_user)
//!   - [`core::output`] - [`OutputLayout`](core::OutputLayout), [`CsvSink`](core::CsvSink)
//! - [`client`] - the collaborator seam and its implementations
//! - [`message`] - entities, users, messages, sticker sets
//! - [`config`] - [`SpyderConfig`](config::SpyderConfig), [`CrawlOptions`](config::CrawlOptions)
//! - [`progress`] - progress callbacks
//! - [`error`] - [`SpyderError`], [`Result`]
//! - [`prelude`] - convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod message;
#[cfg(feature = "snapshot")]
pub mod parsing;
pub mod progress;

pub use error::{Result, SpyderError};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use tgspyder::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Result, SpyderError};

    pub use crate::message::{Entity, EntityKind, MediaKind, Message, StickerSet, User};

    pub use crate::client::{ApiError, ApiResult, MemoryClient, TelegramApi};
    #[cfg(feature = "snapshot")]
    pub use crate::client::{SnapshotClient, SnapshotConfig};

    pub use crate::config::{CrawlOptions, SpyderConfig};
    pub use crate::progress::{Progress, ProgressCallback, no_progress};

    pub use crate::core::{
        CrawlReport, CrawlState, CreatorProfile, OutputLayout, SinkSummary, StickerPackReport,
        UserLookup, crawl_history, enumerate_members, lookup_user, resolve_sticker_pack,
        resolve_target,
    };
}
