//! History crawl: transcript and invite-link extraction in one forward pass.
//!
//! ```text
//! Idle ──first message──▶ Streaming ──exhausted──▶ Completed
//!   │                         │
//!   └──── remote failure ─────┴──────────────────▶ Aborted
//! ```
//!
//! Messages are processed in delivery order (oldest first), one at a time.
//! Each row is flushed as soon as it is written, and every opened sink is
//! closed on every exit path, so an aborted crawl keeps all rows produced
//! before the failure.

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::client::TelegramApi;
use crate::config::CrawlOptions;
use crate::error::{Result, SpyderError};
use crate::message::{Entity, Message};
use crate::progress::{Progress, ProgressCallback};

use super::classifier::classify;
use super::links::InviteLinkSet;
use super::output::{CsvSink, InviteLink, OutputLayout, SinkSummary};
use super::records::ContentRecord;

/// Lifecycle of a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// No message received yet
    Idle,
    /// At least one message received, history not exhausted
    Streaming,
    /// The history was exhausted
    Completed,
    /// The remote source or a sink failed; no further messages were pulled
    Aborted,
}

impl std::fmt::Display for CrawlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrawlState::Idle => write!(f, "idle"),
            CrawlState::Streaming => write!(f, "streaming"),
            CrawlState::Completed => write!(f, "completed"),
            CrawlState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Final status of a crawl.
#[derive(Debug)]
pub struct CrawlReport {
    /// `Completed` or `Aborted`
    pub state: CrawlState,
    pub messages_seen: usize,
    pub invites_found: usize,
    /// Transcript file, if requested
    pub transcript: Option<SinkSummary>,
    /// Invite-link file, if requested
    pub links: Option<SinkSummary>,
    /// Why the crawl aborted
    pub failure: Option<SpyderError>,
}

impl CrawlReport {
    pub fn is_complete(&self) -> bool {
        self.state == CrawlState::Completed
    }

    /// Files written by this crawl, transcript first.
    pub fn files(&self) -> impl Iterator<Item = &SinkSummary> {
        self.transcript.iter().chain(self.links.iter())
    }
}

/// State owned by one crawl: the dedup set, the sinks, and the counters.
///
/// Dropped at the end of the run; dropping closes any sink still open.
#[derive(Debug)]
pub struct RunContext {
    entity: Entity,
    links: InviteLinkSet,
    transcript_sink: Option<CsvSink<ContentRecord>>,
    link_sink: Option<CsvSink<InviteLink>>,
    state: CrawlState,
    messages_seen: usize,
    invites_found: usize,
    last_id: Option<i64>,
}

impl RunContext {
    /// Opens the sinks selected by `options`.
    pub fn open(
        entity: &Entity,
        layout: &OutputLayout,
        options: CrawlOptions,
        at: DateTime<Local>,
    ) -> Result<Self> {
        let name = layout.file_name_part(&entity.output_name());
        let transcript_sink = options
            .transcript
            .then(|| CsvSink::create(layout, &name, at))
            .transpose()?;
        let link_sink = options
            .links
            .then(|| CsvSink::create(layout, &name, at))
            .transpose()?;

        Ok(Self {
            entity: entity.clone(),
            links: InviteLinkSet::new(),
            transcript_sink,
            link_sink,
            state: CrawlState::Idle,
            messages_seen: 0,
            invites_found: 0,
            last_id: None,
        })
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Current counters.
    pub fn progress(&self) -> Progress {
        Progress::crawl(self.messages_seen, self.invites_found)
    }

    /// Links discovered so far, in discovery order.
    pub fn links(&self) -> &InviteLinkSet {
        &self.links
    }

    /// Classifies one message and appends its rows to the open sinks.
    pub fn process(&mut self, message: &Message) -> Result<()> {
        self.state = CrawlState::Streaming;
        self.messages_seen += 1;

        if let Some(last) = self.last_id {
            if message.id < last {
                warn!(id = message.id, previous = last, "message delivered out of order");
            }
        }
        self.last_id = Some(message.id);

        let classification = classify(message);

        if let Some(sink) = self.transcript_sink.as_mut() {
            sink.write(&ContentRecord::classified(message, &self.entity, &classification))?;
        }

        if let Some(sink) = self.link_sink.as_mut() {
            if classification.has_text() {
                for link in self.links.insert_from_text(&classification.text) {
                    sink.write(&InviteLink(link))?;
                    self.invites_found += 1;
                }
            }
        }

        Ok(())
    }

    /// Closes all sinks and produces the final report.
    pub fn finish(self, failure: Option<SpyderError>) -> CrawlReport {
        let mut failure = failure;
        let mut close = |result: Result<SinkSummary>| match result {
            Ok(summary) => Some(summary),
            Err(e) => {
                failure.get_or_insert(e);
                None
            }
        };

        let transcript = self.transcript_sink.map(CsvSink::finish).and_then(&mut close);
        let links = self.link_sink.map(CsvSink::finish).and_then(&mut close);

        let state = if failure.is_some() {
            CrawlState::Aborted
        } else {
            CrawlState::Completed
        };

        CrawlReport {
            state,
            messages_seen: self.messages_seen,
            invites_found: self.invites_found,
            transcript,
            links,
            failure,
        }
    }
}

/// Crawls the entity's whole history once, oldest first.
///
/// Returns `Err` only if an output file cannot be created before crawling
/// starts. Remote failures during the crawl end it early and are reported
/// in [`CrawlReport::failure`] with every row written so far kept on disk.
pub fn crawl_history(
    client: &dyn TelegramApi,
    entity: &Entity,
    layout: &OutputLayout,
    options: CrawlOptions,
    progress: &ProgressCallback,
) -> Result<CrawlReport> {
    let name = layout.file_name_part(&entity.output_name());
    info!(entity = %name, transcript = options.transcript, links = options.links, "crawling messages");

    let mut ctx = RunContext::open(entity, layout, options, Local::now())?;

    let stream = match client.stream_messages(entity) {
        Ok(stream) => stream,
        Err(e) => {
            error!(entity = %name, error = %e, "unable to iterate messages");
            return Ok(ctx.finish(Some(SpyderError::remote("iterating messages of", name, e))));
        }
    };

    let mut failure = None;
    for next in stream {
        let message = match next {
            Ok(message) => message,
            Err(e) => {
                error!(entity = %name, error = %e, seen = ctx.messages_seen, "message stream failed");
                failure = Some(SpyderError::remote("iterating messages of", name.clone(), e));
                break;
            }
        };

        if let Err(e) = ctx.process(&message) {
            error!(entity = %name, error = %e, "unable to write crawl output");
            failure = Some(e);
            break;
        }
        progress(ctx.progress());
    }

    let report = ctx.finish(failure);
    info!(
        entity = %name,
        state = %report.state,
        messages = report.messages_seen,
        invites = report.invites_found,
        "crawl finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiError, MemoryClient};
    use crate::message::{MediaKind, User};
    use crate::progress::no_progress;
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn message(id: i64, text: &str) -> Message {
        Message::new(id, Utc.timestamp_opt(1705314600 + id, 0).unwrap())
            .with_sender(User::new(100 + id).with_first_name("User"))
            .with_text(text)
    }

    fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(ToString::to_string).collect())
            .collect()
    }

    #[test]
    fn test_state_transitions() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        let chat = Entity::group(1, "Chat");

        let mut ctx = RunContext::open(&chat, &layout, CrawlOptions::new(), Local::now()).unwrap();
        assert_eq!(ctx.state(), CrawlState::Idle);
        ctx.process(&message(1, "hi")).unwrap();
        assert_eq!(ctx.state(), CrawlState::Streaming);
        assert_eq!(ctx.finish(None).state, CrawlState::Completed);
    }

    #[test]
    fn test_empty_history_completes_with_header_only_files() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        let chat = Entity::group(1, "Chat");
        let client = MemoryClient::builder().messages(1, Vec::new()).build();

        let report =
            crawl_history(&client, &chat, &layout, CrawlOptions::all(), &no_progress()).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.messages_seen, 0);
        assert_eq!(report.files().count(), 2);
        for file in report.files() {
            assert_eq!(file.rows, 0);
            assert!(file.path.exists());
        }
    }

    #[test]
    fn test_links_ignored_for_media_placeholders() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        let chat = Entity::group(1, "Chat");

        let mut ctx =
            RunContext::open(&chat, &layout, CrawlOptions::all(), Local::now()).unwrap();
        ctx.process(&message(1, "").with_media(MediaKind::Photo)).unwrap();
        ctx.process(&message(2, "t.me/+x, t.me/+y")).unwrap();
        ctx.process(&message(3, "dup t.me/+y")).unwrap();
        assert_eq!(ctx.progress(), Progress::crawl(3, 2));
        assert_eq!(ctx.links().len(), 2);

        let report = ctx.finish(None);
        let links = read_rows(&report.links.unwrap().path);
        assert_eq!(links, vec![vec!["https://t.me/+x"], vec!["https://t.me/+y"]]);
    }

    #[test]
    fn test_links_only_writes_no_transcript() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        let chat = Entity::group(1, "Chat");
        let client = MemoryClient::builder()
            .messages(1, vec![message(1, "t.me/+abc")])
            .build();

        let options = CrawlOptions::new().with_links(true);
        let report = crawl_history(&client, &chat, &layout, options, &no_progress()).unwrap();
        assert!(report.transcript.is_none());
        assert_eq!(report.links.as_ref().unwrap().rows, 1);
        assert!(!dir.path().join("chats").exists());
    }

    #[test]
    fn test_abort_keeps_rows_and_reports_failure() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        let chat = Entity::channel(1, "News");
        let client = MemoryClient::builder()
            .messages(1, (1..=5).map(|i| message(i, "text")).collect())
            .fail_stream_after(1, 2, ApiError::rpc(420, "FLOOD_WAIT_60"))
            .build();

        let report =
            crawl_history(&client, &chat, &layout, CrawlOptions::all(), &no_progress()).unwrap();
        assert_eq!(report.state, CrawlState::Aborted);
        assert_eq!(report.messages_seen, 2);

        let failure = report.failure.as_ref().unwrap();
        assert!(failure.is_remote());
        assert!(failure.to_string().contains("FLOOD_WAIT_60"));

        let transcript = report.transcript.as_ref().unwrap();
        assert_eq!(transcript.rows, 2);
        assert_eq!(read_rows(&transcript.path).len(), 2);
    }

    #[test]
    fn test_stream_open_failure_aborts_from_idle() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        let chat = Entity::channel(9, "Private");
        let client = MemoryClient::default();

        let report = crawl_history(
            &client,
            &chat,
            &layout,
            CrawlOptions::new().with_transcript(true),
            &no_progress(),
        )
        .unwrap();
        assert_eq!(report.state, CrawlState::Aborted);
        assert_eq!(report.messages_seen, 0);
        assert_eq!(report.transcript.as_ref().unwrap().rows, 0);
    }

    #[test]
    fn test_progress_observer_sees_running_counters() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        let chat = Entity::group(1, "Chat");
        let client = MemoryClient::builder()
            .messages(
                1,
                vec![message(1, "t.me/+a"), message(2, "none"), message(3, "t.me/+b")],
            )
            .build();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let progress: ProgressCallback = Arc::new(move |p| {
            seen_clone
                .lock()
                .unwrap()
                .push((p.messages_seen, p.invites_found));
        });

        crawl_history(&client, &chat, &layout, CrawlOptions::all(), &progress).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(1, 1), (2, 1), (3, 2)]);
    }

    #[test]
    fn test_broadcast_rows_use_entity_title() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        let chat = Entity::channel(1, "Daily Leaks");
        let post = Message::new(1, Utc::now()).with_text("post");
        let client = MemoryClient::builder().messages(1, vec![post]).build();

        let report = crawl_history(
            &client,
            &chat,
            &layout,
            CrawlOptions::new().with_transcript(true),
            &no_progress(),
        )
        .unwrap();
        let rows = read_rows(&report.transcript.unwrap().path);
        assert_eq!(rows[0][2], "Daily Leaks");
    }
}
