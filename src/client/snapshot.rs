//! Offline collaborator backed by a snapshot directory.
//!
//! A snapshot is what an earlier collection (or a Telegram Desktop export)
//! left on disk:
//!
//! ```text
//! snapshot.json
//! messages/
//!   1001.json      Telegram Desktop export of entity 1001
//! ```
//!
//! `snapshot.json`:
//!
//! ```json
//! {
//!   "entities": [
//!     {"id": 1001, "kind": "group", "title": "OSINT Chat", "username": "osintchat"},
//!     {"id": 42, "kind": "user", "username": "alice", "first_name": "Alice"}
//!   ],
//!   "invites": {"abc123": 1001},
//!   "joined": [1001],
//!   "hidden": [77],
//!   "participants": {"1001": [42]},
//!   "sticker_sets": [{"id": 5299989643264, "short_name": "pack", "title": "Pack", "count": 12}]
//! }
//! ```
//!
//! Message histories are streamed one JSON object at a time, so the export
//! file is never loaded whole.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::SpyderError;
use crate::message::{Entity, Message, StickerSet, User};
use crate::parsing::telegram::{TelegramRawMessage, parse_telegram_message};

use super::memory::normalize_handle;
use super::{ApiError, ApiResult, MessageStream, TelegramApi};

/// Name of the manifest file inside a snapshot directory.
pub const MANIFEST_FILE: &str = "snapshot.json";

/// How far into an export to look for the `messages` array.
const HEADER_LIMIT: usize = 10 * 1024 * 1024;

/// Options for reading message histories.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotConfig {
    /// Buffer size for file reading.
    ///
    /// Default: 64KB.
    pub buffer_size: usize,

    /// Maximum size of a single message record in bytes.
    ///
    /// Default: 10MB. Larger records fail the stream.
    pub max_message_size: usize,

    /// Whether to skip malformed records instead of failing the stream.
    ///
    /// Default: `false`.
    pub skip_invalid: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,
            max_message_size: 10 * 1024 * 1024,
            skip_invalid: false,
        }
    }
}

impl SnapshotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    #[must_use]
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    #[must_use]
    pub fn with_skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Manifest {
    entities: Vec<Entity>,
    invites: HashMap<String, i64>,
    joined: HashSet<i64>,
    hidden: HashSet<i64>,
    participants: HashMap<i64, Vec<i64>>,
    sticker_sets: Vec<StickerSet>,
}

/// [`TelegramApi`] implementation reading from a snapshot directory.
#[derive(Debug)]
pub struct SnapshotClient {
    root: PathBuf,
    config: SnapshotConfig,
    by_id: HashMap<i64, Entity>,
    handles: HashMap<String, i64>,
    invites: HashMap<String, i64>,
    joined: HashSet<i64>,
    hidden: HashSet<i64>,
    participants: HashMap<i64, Vec<i64>>,
    sticker_sets: HashMap<String, StickerSet>,
}

impl SnapshotClient {
    /// Opens a snapshot directory with default options.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SpyderError> {
        Self::open_with_config(root, SnapshotConfig::default())
    }

    /// Opens a snapshot directory.
    pub fn open_with_config(
        root: impl AsRef<Path>,
        config: SnapshotConfig,
    ) -> Result<Self, SpyderError> {
        let root = root.as_ref().to_path_buf();
        let manifest_path = root.join(MANIFEST_FILE);
        let content = fs::read_to_string(&manifest_path)
            .map_err(|e| SpyderError::snapshot(&manifest_path, e.to_string()))?;
        let manifest: Manifest = serde_json::from_str(&content)
            .map_err(|e| SpyderError::snapshot(&manifest_path, e.to_string()))?;

        let handles = manifest
            .entities
            .iter()
            .filter_map(|e| {
                e.username
                    .as_ref()
                    .map(|u| (u.to_lowercase(), e.id))
            })
            .collect();
        let by_id = manifest.entities.into_iter().map(|e| (e.id, e)).collect();
        let sticker_sets = manifest
            .sticker_sets
            .into_iter()
            .map(|s| (s.short_name.clone(), s))
            .collect();

        debug!(root = %root.display(), "snapshot opened");

        Ok(Self {
            root,
            config,
            by_id,
            handles,
            invites: manifest.invites,
            joined: manifest.joined,
            hidden: manifest.hidden,
            participants: manifest.participants,
            sticker_sets,
        })
    }

    fn history_path(&self, entity_id: i64) -> PathBuf {
        self.root.join("messages").join(format!("{entity_id}.json"))
    }

    fn entity(&self, id: i64) -> ApiResult<Entity> {
        if self.hidden.contains(&id) {
            return Err(ApiError::Unresolvable(id));
        }
        self.by_id.get(&id).cloned().ok_or(ApiError::Unresolvable(id))
    }

    fn user(&self, id: i64) -> User {
        self.by_id
            .get(&id)
            .and_then(Entity::as_user)
            .unwrap_or_else(|| User::new(id))
    }
}

impl TelegramApi for SnapshotClient {
    fn name(&self) -> &'static str {
        "Snapshot"
    }

    fn resolve(&self, handle_or_link: &str) -> ApiResult<Entity> {
        let key = normalize_handle(handle_or_link);

        // Invite links of chats the account already joined
        let invite = key
            .strip_prefix('+')
            .or_else(|| key.strip_prefix("joinchat/"));
        if let Some(code) = invite {
            return match self.invites.get(code) {
                Some(id) if self.joined.contains(id) => self.entity(*id),
                _ => Err(ApiError::NotFound(format!("invite '{code}'"))),
            };
        }

        if let Ok(id) = key.parse::<i64>() {
            return self.entity(id);
        }

        self.handles
            .get(&key.to_lowercase())
            .map(|id| self.entity(*id))
            .unwrap_or_else(|| Err(ApiError::NotFound(format!("username '{key}'"))))
    }

    fn resolve_id(&self, id: i64) -> ApiResult<Entity> {
        self.entity(id)
    }

    fn import_invite(&self, code: &str) -> ApiResult<Entity> {
        let id = self
            .invites
            .get(code)
            .ok_or_else(|| ApiError::rpc(400, "INVITE_HASH_INVALID"))?;
        if self.joined.contains(id) {
            return Err(ApiError::AlreadyParticipant);
        }
        self.by_id
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("chat behind invite '{code}'")))
    }

    fn list_participants(&self, entity: &Entity) -> ApiResult<Vec<User>> {
        let ids = self
            .participants
            .get(&entity.id)
            .ok_or_else(|| ApiError::rpc(400, "CHAT_ADMIN_REQUIRED"))?;
        Ok(ids.iter().map(|id| self.user(*id)).collect())
    }

    fn stream_messages<'a>(&'a self, entity: &Entity) -> ApiResult<MessageStream<'a>> {
        let path = self.history_path(entity.id);
        let file = File::open(&path).map_err(|e| {
            ApiError::Unexpected(format!("cannot open {}: {e}", path.display()))
        })?;
        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let iter = ExportMessageIterator::new(reader, self.config, &self.by_id)?;
        Ok(Box::new(iter))
    }

    fn fetch_sticker_set(&self, short_name: &str) -> ApiResult<StickerSet> {
        self.sticker_sets
            .get(short_name)
            .cloned()
            .ok_or_else(|| ApiError::rpc(400, "STICKERSET_INVALID"))
    }
}

/// Iterator over the `messages` array of a Telegram Desktop export.
struct ExportMessageIterator<'a, R: BufRead> {
    reader: R,
    config: SnapshotConfig,
    known: &'a HashMap<i64, Entity>,
    line: String,
    cursor: usize,
    buffer: String,
    finished: bool,
}

impl<'a, R: BufRead> ExportMessageIterator<'a, R> {
    /// Creates a new iterator positioned just inside the `messages` array.
    fn new(
        mut reader: R,
        config: SnapshotConfig,
        known: &'a HashMap<i64, Entity>,
    ) -> ApiResult<Self> {
        let mut line = String::new();
        let mut total_read = 0usize;

        let cursor = loop {
            line.clear();
            let bytes = reader.read_line(&mut line).map_err(io_error)?;
            if bytes == 0 {
                return Err(ApiError::Unexpected(
                    "could not find 'messages' array in export".into(),
                ));
            }
            total_read += bytes;

            if let Some(key) = line.find("\"messages\"") {
                if let Some(open) = line[key..].find('[') {
                    break key + open + 1;
                }
            }

            if total_read > HEADER_LIMIT {
                return Err(ApiError::Unexpected(
                    "export header too large or 'messages' array not found".into(),
                ));
            }
        };

        Ok(Self {
            reader,
            config,
            known,
            line,
            cursor,
            buffer: String::new(),
            finished: false,
        })
    }

    /// Reads the next JSON object of the array, honoring string literals.
    fn read_next_object(&mut self) -> ApiResult<Option<String>> {
        self.buffer.clear();
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        loop {
            if self.cursor >= self.line.len() {
                self.line.clear();
                self.cursor = 0;
                let bytes = self.reader.read_line(&mut self.line).map_err(io_error)?;
                if bytes == 0 {
                    self.finished = true;
                    if depth > 0 {
                        return Err(ApiError::Unexpected(
                            "export ended in the middle of a message".into(),
                        ));
                    }
                    return Ok(None);
                }
            }

            let rest = &self.line[self.cursor..];
            let mut consumed = rest.len();
            let mut complete = false;
            let mut end_of_array = false;

            for (i, ch) in rest.char_indices() {
                if depth == 0 {
                    match ch {
                        '{' => {
                            depth = 1;
                            self.buffer.push(ch);
                        }
                        ']' => {
                            end_of_array = true;
                            consumed = i + 1;
                            break;
                        }
                        _ => {}
                    }
                    continue;
                }

                self.buffer.push(ch);
                if in_string {
                    if escaped {
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == '"' {
                        in_string = false;
                    }
                    continue;
                }

                match ch {
                    '"' => in_string = true,
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            complete = true;
                            consumed = i + ch.len_utf8();
                            break;
                        }
                    }
                    _ => {}
                }
            }

            self.cursor += consumed;

            if end_of_array {
                self.finished = true;
                return Ok(None);
            }

            if self.buffer.len() > self.config.max_message_size {
                self.finished = true;
                return Err(ApiError::Unexpected(format!(
                    "message record too large: {} bytes (max: {})",
                    self.buffer.len(),
                    self.config.max_message_size
                )));
            }

            if complete {
                return Ok(Some(std::mem::take(&mut self.buffer)));
            }
        }
    }

    fn parse_record(&self, json_str: &str) -> ApiResult<Message> {
        let raw: TelegramRawMessage = serde_json::from_str(json_str)
            .map_err(|e| ApiError::Unexpected(format!("malformed message record: {e}")))?;
        let mut message = parse_telegram_message(&raw).ok_or_else(|| {
            ApiError::Unexpected(format!("message {} has no usable date", raw.id))
        })?;

        // Fill in handle and last name from the entity table
        if let Some(sender) = message.sender.as_mut() {
            if let Some(user) = self.known.get(&sender.id).and_then(Entity::as_user) {
                *sender = user;
            }
        }
        Ok(message)
    }
}

impl<R: BufRead> Iterator for ExportMessageIterator<'_, R> {
    type Item = ApiResult<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            let parsed = match self.read_next_object() {
                Ok(Some(json_str)) => self.parse_record(&json_str),
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            };

            match parsed {
                Ok(msg) => return Some(Ok(msg)),
                Err(e) if self.config.skip_invalid => {
                    warn!(error = %e, "skipping malformed message record");
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn io_error(err: std::io::Error) -> ApiError {
    ApiError::Unexpected(format!("read failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{EntityKind, MediaKind};
    use std::io::Cursor;
    use tempfile::TempDir;

    const EXPORT: &str = r#"{
  "name": "OSINT Chat",
  "type": "public_supergroup",
  "id": 1001,
  "messages": [
    {"id": 1, "type": "message", "date_unixtime": "1705314600", "from": "Alice", "from_id": "user42", "text": "hello {not a brace}"},
    {
      "id": 2,
      "type": "message",
      "date_unixtime": "1705314660",
      "from": "Bob",
      "from_id": "user43",
      "photo": "photos/photo_1.jpg",
      "text": ""
    },
    {"id": 3, "type": "message", "date_unixtime": "1705314720", "from": "Alice", "from_id": "user42", "text": ["see ", {"type": "link", "text": "t.me/+abc123"}]}
  ]
}"#;

    fn iterate(json: &str, config: SnapshotConfig) -> Vec<ApiResult<Message>> {
        let known = HashMap::new();
        let reader = BufReader::new(Cursor::new(json.as_bytes().to_vec()));
        ExportMessageIterator::new(reader, config, &known)
            .unwrap()
            .collect()
    }

    fn write_snapshot() -> TempDir {
        let dir = TempDir::new().unwrap();
        let manifest = r#"{
  "entities": [
    {"id": 1001, "kind": "group", "title": "OSINT Chat", "username": "OsintChat"},
    {"id": 2002, "kind": "channel", "title": "Private"},
    {"id": 42, "kind": "user", "username": "alice", "first_name": "Alice", "last_name": "Liddell"}
  ],
  "invites": {"abc123": 1001, "fresh": 2002},
  "joined": [1001],
  "hidden": [77],
  "participants": {"1001": [42, 43]},
  "sticker_sets": [{"id": 5299989643264, "short_name": "pack", "title": "Pack", "count": 3}]
}"#;
        fs::write(dir.path().join(MANIFEST_FILE), manifest).unwrap();
        fs::create_dir(dir.path().join("messages")).unwrap();
        fs::write(dir.path().join("messages").join("1001.json"), EXPORT).unwrap();
        dir
    }

    #[test]
    fn test_iterator_reads_pretty_and_compact_records() {
        let messages: Vec<_> = iterate(EXPORT, SnapshotConfig::default())
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].text, "hello {not a brace}");
        assert_eq!(messages[1].media, MediaKind::Photo);
        assert_eq!(messages[2].text, "see t.me/+abc123");
    }

    #[test]
    fn test_iterator_single_line_export() {
        let json = r#"{"name": "x", "messages": [{"id": 1, "date_unixtime": "1705314600", "text": "a"}, {"id": 2, "date_unixtime": "1705314601", "text": "b"}]}"#;
        let ids: Vec<i64> = iterate(json, SnapshotConfig::default())
            .into_iter()
            .map(|m| m.unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_iterator_fails_on_malformed_record() {
        let json = r#"{"messages": [
    {"id": 1, "date_unixtime": "1705314600", "text": "ok"},
    {"id": 2, "text": "no date"},
    {"id": 3, "date_unixtime": "1705314700", "text": "never reached"}
  ]}"#;
        let results = iterate(json, SnapshotConfig::default());
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_iterator_skips_malformed_when_configured() {
        let json = r#"{"messages": [
    {"id": 1, "date_unixtime": "1705314600", "text": "ok"},
    {"id": 2, "text": "no date"},
    {"id": 3, "date_unixtime": "1705314700", "text": "kept"}
  ]}"#;
        let results = iterate(json, SnapshotConfig::new().with_skip_invalid(true));
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(Result::is_ok));
    }

    #[test]
    fn test_iterator_truncated_export() {
        let json = "{\"messages\": [\n{\"id\": 1, \"date_unixtime\": \"1705314600\",";
        let results = iterate(json, SnapshotConfig::default());
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_missing_messages_array() {
        let known = HashMap::new();
        let reader = BufReader::new(Cursor::new(b"{\"name\": \"x\"}".to_vec()));
        assert!(ExportMessageIterator::new(reader, SnapshotConfig::default(), &known).is_err());
    }

    #[test]
    fn test_record_too_large() {
        let results = iterate(EXPORT, SnapshotConfig::new().with_max_message_size(64));
        assert!(results.last().unwrap().is_err());
    }

    #[test]
    fn test_snapshot_resolve_and_invites() {
        let dir = write_snapshot();
        let client = SnapshotClient::open(dir.path()).unwrap();

        assert_eq!(client.resolve("@osintchat").unwrap().id, 1001);
        assert_eq!(client.resolve("https://t.me/OsintChat").unwrap().id, 1001);
        assert_eq!(client.resolve("https://t.me/+abc123").unwrap().id, 1001);
        assert!(client.resolve("t.me/+fresh").is_err());

        assert_eq!(client.import_invite("abc123"), Err(ApiError::AlreadyParticipant));
        assert_eq!(client.import_invite("fresh").unwrap().kind, EntityKind::Channel);
        assert!(matches!(
            client.import_invite("bogus"),
            Err(ApiError::Rpc { .. })
        ));

        assert_eq!(client.resolve_id(77), Err(ApiError::Unresolvable(77)));
    }

    #[test]
    fn test_snapshot_participants_and_stream_enrichment() {
        let dir = write_snapshot();
        let client = SnapshotClient::open(dir.path()).unwrap();
        let chat = client.resolve("osintchat").unwrap();

        let users = client.list_participants(&chat).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username.as_deref(), Some("alice"));
        assert_eq!(users[1], User::new(43));

        let messages: Vec<_> = client
            .stream_messages(&chat)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        let alice = messages[0].sender.as_ref().unwrap();
        assert_eq!(alice.last_name.as_deref(), Some("Liddell"));
        assert_eq!(alice.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_snapshot_missing_history_fails_to_open() {
        let dir = write_snapshot();
        let client = SnapshotClient::open(dir.path()).unwrap();
        let private = client.resolve_id(2002).unwrap();
        assert!(client.stream_messages(&private).is_err());
    }

    #[test]
    fn test_snapshot_sticker_set() {
        let dir = write_snapshot();
        let client = SnapshotClient::open(dir.path()).unwrap();
        assert_eq!(client.fetch_sticker_set("pack").unwrap().count, 3);
        assert!(client.fetch_sticker_set("other").is_err());
    }

    #[test]
    fn test_open_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = SnapshotClient::open(dir.path()).unwrap_err();
        assert!(err.to_string().contains(MANIFEST_FILE));
    }
}
