//! Output sinks.
//!
//! Every artifact is a CSV file created fresh per run under a fixed layout:
//!
//! ```text
//! <root>/members/members_<name>_<YYYYMMDD_HHMMSS>.csv
//! <root>/chats/messages_<name>_<YYYYMMDD_HHMMSS>.csv
//! <root>/crawled_links/crawled_links_<name>_<YYYYMMDD_HHMMSS>.csv
//! ```
//!
//! - [`OutputLayout`] / [`safe_name`] - where files go and how they are named
//! - [`CsvSink`] - append-only writer, header on open, flushed per row
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::Local;
//! use tgspyder::core::output::{CsvSink, OutputLayout};
//! use tgspyder::core::InviteLink;
//!
//! let layout = OutputLayout::new("TGSpyder Output");
//! let mut sink = CsvSink::<InviteLink>::create(&layout, "OSINT Chat", Local::now())?;
//! sink.write(&InviteLink::new("https://t.me/+abc123"))?;
//! let summary = sink.finish()?;
//! println!("{} rows -> {}", summary.rows, summary.path.display());
//! # Ok::<(), tgspyder::SpyderError>(())
//! ```

mod csv_writer;
mod layout;

pub use csv_writer::{CsvRecord, CsvSink, InviteLink, SinkSummary};
pub use layout::{Artifact, OutputLayout, safe_name, stamp};
