//! Core pipeline for tgspyder.
//!
//! This module contains:
//! - [`classifier`] - Message text or media placeholder
//! - [`links`] - Invite-link extraction and per-run dedup
//! - [`records`] - Rows written to the output files
//! - [`output`] - File layout and CSV sinks
//! - [`resolver`] - Target to entity resolution
//! - [`members`] - Participant snapshot
//! - [`crawler`] - History crawl (transcript and invite links)
//! - [`stickers`] - Sticker-pack creator inference
//! - [`lookup`] - User lookup
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use tgspyder::client::MemoryClient;
//! use tgspyder::config::CrawlOptions;
//! use tgspyder::core::{OutputLayout, crawl_history, resolve_target};
//! use tgspyder::message::{Entity, Message};
//! use tgspyder::progress::no_progress;
//!
//! # fn main() -> tgspyder::Result<()> {
//! # let dir = tempfile::tempdir()?;
//! let client = MemoryClient::builder()
//!     .entity("osint", Entity::group(1, "OSINT"))
//!     .messages(1, vec![Message::new(1, Utc::now()).with_text("t.me/+abc123")])
//!     .build();
//!
//! let entity = resolve_target(&client, "@osint")?;
//! let layout = OutputLayout::new(dir.path());
//! let report = crawl_history(&client, &entity, &layout, CrawlOptions::all(), &no_progress())?;
//! assert_eq!(report.invites_found, 1);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod crawler;
pub mod links;
pub mod lookup;
pub mod members;
pub mod output;
pub mod records;
pub mod resolver;
pub mod stickers;

pub use classifier::{Classification, classify, media_label};
pub use crawler::{CrawlReport, CrawlState, RunContext, crawl_history};
pub use links::{InviteLinkSet, extract_invite_links, normalize_link};
pub use lookup::{UserLookup, UserQuery, UserReport, lookup_user};
pub use members::enumerate_members;
pub use output::{CsvSink, InviteLink, OutputLayout, SinkSummary, safe_name};
pub use records::{ContentRecord, ParticipantRecord, sender_label};
pub use resolver::{invite_code, is_invite_link, resolve_target};
pub use stickers::{
    CreatorProfile, StickerPackReport, creator_id, parse_pack_reference, resolve_sticker_pack,
};
