//! Telegram Desktop export records.
//!
//! A Telegram Desktop "Export chat history" JSON file looks like:
//!
//! ```json
//! {
//!   "name": "OSINT Chat",
//!   "type": "public_supergroup",
//!   "id": 1001,
//!   "messages": [
//!     {"id": 1, "type": "message", "date_unixtime": "1705314600",
//!      "from": "Alice", "from_id": "user42", "text": "hello"},
//!     {"id": 2, "type": "message", "date_unixtime": "1705314660",
//!      "from": "Bob", "from_id": "user43", "photo": "photos/photo_1.jpg", "text": ""}
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::message::{MediaKind, Message, User};

/// Raw Telegram Desktop message record.
#[derive(Debug, Default, Deserialize)]
pub struct TelegramRawMessage {
    pub id: i64,
    /// `"message"` or `"service"`
    #[serde(rename = "type", default)]
    pub msg_type: String,
    /// Unix timestamp as string
    pub date_unixtime: Option<String>,
    /// Author display name
    pub from: Option<String>,
    /// Author reference, e.g. `"user42"` or `"channel1001"`
    pub from_id: Option<String>,
    /// Service message author name
    pub actor: Option<String>,
    /// Service message author reference
    pub actor_id: Option<String>,
    /// Message text (string or array of entities)
    pub text: Option<Value>,
    /// Relative path of an attached photo
    pub photo: Option<String>,
    /// Relative path of an attached file
    pub file: Option<String>,
    /// Media sub-type: `sticker`, `video_file`, `voice_message`, ...
    pub media_type: Option<String>,
    /// Present on location, poll, contact, and similar messages
    pub location_information: Option<Value>,
    pub poll: Option<Value>,
    pub contact_information: Option<Value>,
}

/// Extracts text content from Telegram's `text` field.
///
/// The field is either a plain string or an array mixing strings with
/// entity objects (`{"type": "link", "text": "..."}`); entity text is
/// concatenated in order.
pub fn extract_telegram_text(text_value: &Value) -> String {
    match text_value {
        Value::String(s) => s.clone(),
        Value::Array(arr) => arr
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj
                    .get("text")
                    .and_then(|v| v.as_str())
                    .map(ToString::to_string),
                _ => None,
            })
            .collect::<String>(),
        _ => String::new(),
    }
}

/// Parses a Unix timestamp string to DateTime.
pub fn parse_unix_timestamp(ts_str: &str) -> Option<DateTime<Utc>> {
    ts_str
        .parse::<i64>()
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
}

/// Maps the export's media fields onto [`MediaKind`].
pub fn media_kind(msg: &TelegramRawMessage) -> MediaKind {
    if msg.photo.is_some() {
        return MediaKind::Photo;
    }
    match msg.media_type.as_deref() {
        Some("sticker") => MediaKind::Sticker,
        Some(_) if msg.file.is_some() => MediaKind::Document,
        Some(_) => MediaKind::Other,
        None if msg.file.is_some() => MediaKind::Document,
        None if msg.location_information.is_some()
            || msg.poll.is_some()
            || msg.contact_information.is_some() =>
        {
            MediaKind::Other
        }
        None => MediaKind::None,
    }
}

/// Splits a reference like `"user42"` into its prefix and numeric id.
fn split_peer_ref(peer: &str) -> Option<(&str, i64)> {
    let pos = peer.find(|c: char| c.is_ascii_digit() || c == '-')?;
    let (prefix, digits) = peer.split_at(pos);
    digits.parse().ok().map(|id| (prefix, id))
}

/// Builds the sender of a record. Posts signed by a channel have no sender.
fn parse_sender(msg: &TelegramRawMessage) -> Option<User> {
    let (name, peer) = if msg.msg_type == "service" {
        (msg.actor.as_ref(), msg.actor_id.as_ref())
    } else {
        (msg.from.as_ref(), msg.from_id.as_ref())
    };

    let (prefix, id) = split_peer_ref(peer?)?;
    if prefix != "user" {
        return None;
    }

    let mut user = User::new(id);
    user.first_name = name.filter(|n| !n.is_empty()).cloned();
    Some(user)
}

/// Converts a raw export record into a [`Message`].
///
/// Returns `None` when the record carries no usable date; the caller decides
/// whether that is fatal.
pub fn parse_telegram_message(msg: &TelegramRawMessage) -> Option<Message> {
    let date = msg
        .date_unixtime
        .as_deref()
        .and_then(parse_unix_timestamp)?;

    let text = msg
        .text
        .as_ref()
        .map(extract_telegram_text)
        .unwrap_or_default();

    Some(Message {
        id: msg.id,
        date,
        sender: parse_sender(msg),
        text,
        media: media_kind(msg),
    })
}
