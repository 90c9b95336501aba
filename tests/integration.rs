//! Integration tests for the pipeline over the in-memory client.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use tgspyder::core::UserReport;
use tgspyder::prelude::*;

fn at(offset: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1705314600 + offset, 0).unwrap()
}

fn rows(path: &Path) -> Vec<csv::StringRecord> {
    csv::Reader::from_path(path)
        .unwrap()
        .records()
        .map(std::result::Result::unwrap)
        .collect()
}

fn alice() -> User {
    User::new(42).with_username("alice").with_first_name("Alice")
}

// ============================================================================
// Crawl
// ============================================================================

#[test]
fn test_crawl_transcript_and_links_end_to_end() {
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());
    let chat = Entity::group(1001, "OSINT Chat");

    let client = MemoryClient::builder()
        .entity("osintchat", chat.clone())
        .messages(
            1001,
            vec![
                Message::new(1, at(0)).with_sender(alice()).with_text("hello"),
                Message::new(2, at(60))
                    .with_sender(alice())
                    .with_media(MediaKind::Photo),
                Message::new(3, at(120))
                    .with_sender(alice())
                    .with_text("check t.me/+abc123 and t.me/+abc123 again"),
            ],
        )
        .build();

    let entity = resolve_target(&client, "@osintchat").unwrap();
    let report = crawl_history(&client, &entity, &layout, CrawlOptions::all(), &no_progress()).unwrap();

    assert_eq!(report.state, CrawlState::Completed);
    assert_eq!(report.messages_seen, 3);
    assert_eq!(report.invites_found, 1);

    let transcript = rows(&report.transcript.as_ref().unwrap().path);
    assert_eq!(transcript.len(), 3);
    assert_eq!(&transcript[0][3], "hello");
    assert_eq!(&transcript[1][3], "[Photo]");
    assert_eq!(&transcript[1][2], "Alice");

    let links = rows(&report.links.as_ref().unwrap().path);
    assert_eq!(links.len(), 1);
    assert_eq!(&links[0][0], "https://t.me/+abc123");
}

#[test]
fn test_crawl_abort_after_two_of_five() {
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());
    let chat = Entity::channel(7, "News");

    let client = MemoryClient::builder()
        .messages(
            7,
            (1..=5)
                .map(|i| Message::new(i, at(i)).with_text(format!("post {i}")))
                .collect(),
        )
        .fail_stream_after(7, 2, ApiError::rpc(500, "INTERNAL"))
        .build();

    let report = crawl_history(&client, &chat, &layout, CrawlOptions::all(), &no_progress()).unwrap();
    assert_eq!(report.state, CrawlState::Aborted);

    let path = &report.transcript.as_ref().unwrap().path;
    let transcript = rows(path);
    assert_eq!(transcript.len(), 2);
    assert_eq!(&transcript[1][3], "post 2");
    assert_eq!(&transcript[0][2], "News");

    // File closed cleanly: header plus two complete lines.
    let content = fs::read_to_string(path).unwrap();
    assert!(content.ends_with('\n'));
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn test_transcript_ids_non_decreasing() {
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());
    let chat = Entity::group(1, "Chat");

    let client = MemoryClient::builder()
        .messages(
            1,
            [3, 5, 5, 8, 13]
                .into_iter()
                .map(|id| Message::new(id, at(id)).with_text("x"))
                .collect(),
        )
        .build();

    let report = crawl_history(
        &client,
        &chat,
        &layout,
        CrawlOptions::new().with_transcript(true),
        &no_progress(),
    )
    .unwrap();

    let ids: Vec<i64> = rows(&report.transcript.unwrap().path)
        .iter()
        .map(|r| r[0].parse().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 5, 5, 8, 13]);
    assert!(ids.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_links_in_first_discovery_order() {
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());
    let chat = Entity::group(1, "Chat");

    let client = MemoryClient::builder()
        .messages(
            1,
            vec![
                Message::new(1, at(1)).with_text("t.me/+b https://t.me/joinchat/a"),
                Message::new(2, at(2)).with_text("again t.me/+b, then t.me/+c."),
                Message::new(3, at(3)).with_text("(https://t.me/joinchat/a)"),
            ],
        )
        .build();

    let report = crawl_history(
        &client,
        &chat,
        &layout,
        CrawlOptions::new().with_links(true),
        &no_progress(),
    )
    .unwrap();

    let links: Vec<String> = rows(&report.links.unwrap().path)
        .iter()
        .map(|r| r[0].to_string())
        .collect();
    assert_eq!(
        links,
        vec![
            "https://t.me/+b",
            "https://t.me/joinchat/a",
            "https://t.me/+c",
        ]
    );
}

// ============================================================================
// Resolution and members
// ============================================================================

#[test]
fn test_invite_target_imports_then_enumerates() {
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());
    let chat = Entity::group(5, "Hidden Group");

    let client = MemoryClient::builder()
        .invite("AbC123", Ok(chat.clone()))
        .participants(5, Ok(vec![alice(), User::new(43).with_phone("+100")]))
        .build();

    let entity = resolve_target(&client, "https://t.me/+AbC123").unwrap();
    assert_eq!(entity, chat);

    let summary = enumerate_members(&client, &entity, &layout, &no_progress()).unwrap();
    assert_eq!(summary.rows, 2);
    assert!(summary.path.starts_with(dir.path().join("members")));

    let members = rows(&summary.path);
    assert_eq!(&members[0][3], "https://t.me/alice");
    assert_eq!(&members[1][2], "");
    assert_eq!(&members[1][4], "+100");
}

#[test]
fn test_already_participant_falls_back_to_lookup() {
    let chat = Entity::group(5, "Joined Group");
    let client = MemoryClient::builder()
        .invite("joined", Err(ApiError::AlreadyParticipant))
        .entity("t.me/+joined", chat.clone())
        .build();

    assert_eq!(resolve_target(&client, "t.me/+joined").unwrap(), chat);
}

#[test]
fn test_operations_are_isolated() {
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());
    let chat = Entity::channel(9, "Locked");

    // No participants scripted: members fail, the crawl still runs.
    let client = MemoryClient::builder()
        .messages(9, vec![Message::new(1, at(1)).with_text("t.me/+zzz")])
        .build();

    let members = enumerate_members(&client, &chat, &layout, &no_progress());
    assert!(members.unwrap_err().is_remote());

    let report = crawl_history(&client, &chat, &layout, CrawlOptions::all(), &no_progress()).unwrap();
    assert!(report.is_complete());
    assert_eq!(report.invites_found, 1);
}

// ============================================================================
// Stickers and user lookup
// ============================================================================

#[test]
fn test_sticker_pack_and_user_lookup() {
    let creator = User::new(1234).with_username("maker").with_first_name("Mae");
    let client = MemoryClient::builder()
        .sticker_set(StickerSet {
            id: (1234_i64 << 32) | 5678,
            short_name: "Cats".into(),
            title: "Cats".into(),
            count: 10,
        })
        .entity("maker", Entity::user(creator.clone()))
        .build();

    let pack = resolve_sticker_pack(&client, "t.me/addstickers/Cats").unwrap();
    assert_eq!(pack.creator_id, 1234);
    assert_eq!(pack.creator, CreatorProfile::Resolved(creator.clone()));

    let by_id = lookup_user(&client, "1234").unwrap();
    let by_handle = lookup_user(&client, "@maker").unwrap();
    assert_eq!(by_id, by_handle);
    assert!(UserReport(by_id.user().unwrap()).to_string().contains("https://t.me/maker"));
}
