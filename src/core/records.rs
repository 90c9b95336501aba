//! Rows derived from collaborator data, one type per output artifact.

use chrono::{DateTime, Local, Utc};

use crate::message::{Entity, Message, User};

use super::classifier::{Classification, classify};

/// Label used for broadcast posts when the entity has no title.
pub const BROADCAST_FALLBACK: &str = "Channel";

/// Format of the `date` column, in local time.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Resolves the label written in the `sender` column.
///
/// Order: first+last name, then handle, then numeric id. Without a sender
/// (a broadcast post) the entity title is used, or `"Channel"`.
///
/// ```
/// use tgspyder::core::sender_label;
/// use tgspyder::message::{Entity, User};
///
/// let chat = Entity::channel(1, "News");
/// assert_eq!(sender_label(Some(&User::new(7).with_username("seven")), &chat), "seven");
/// assert_eq!(sender_label(Some(&User::new(7)), &chat), "7");
/// assert_eq!(sender_label(None, &chat), "News");
/// ```
pub fn sender_label(sender: Option<&User>, entity: &Entity) -> String {
    match sender {
        Some(user) => {
            let full_name = user.full_name();
            if !full_name.is_empty() {
                return full_name;
            }
            match user.username.as_deref() {
                Some(handle) if !handle.is_empty() => handle.to_string(),
                _ => user.id.to_string(),
            }
        }
        None => entity
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(BROADCAST_FALLBACK)
            .to_string(),
    }
}

/// One transcript row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub message_id: i64,
    pub date: DateTime<Utc>,
    pub sender: String,
    pub text: String,
}

impl ContentRecord {
    /// Builds the transcript row of a message.
    pub fn from_message(message: &Message, entity: &Entity) -> Self {
        Self::classified(message, entity, &classify(message))
    }

    /// Builds the row from an existing classification of `message`.
    pub fn classified(message: &Message, entity: &Entity, classification: &Classification) -> Self {
        Self {
            message_id: message.id,
            date: message.date,
            sender: sender_label(message.sender.as_ref(), entity),
            text: classification.text.clone(),
        }
    }

    /// The `date` column: local time, `YYYY-MM-DD HH:MM:SS`.
    pub fn local_date(&self) -> String {
        self.date.with_timezone(&Local).format(DATE_FORMAT).to_string()
    }
}

/// One members row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub profile_link: String,
    pub phone: String,
}

impl From<&User> for ParticipantRecord {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone().unwrap_or_default(),
            name: user.full_name(),
            profile_link: user.profile_link().unwrap_or_default(),
            phone: user.phone.clone().unwrap_or_default(),
        }
    }
}
