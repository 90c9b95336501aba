//! Data model produced by the collaborator client.
//!
//! This module provides the read-only types the crawl pipeline consumes:
//! - [`Entity`] - a resolved user, group, or channel
//! - [`User`] - a message sender or group participant
//! - [`Message`] - one message of an entity's history
//! - [`MediaKind`] - the closed set of media markers a message can carry
//! - [`StickerSet`] - sticker-pack metadata
//!
//! # Examples
//!
//! ```
//! use tgspyder::message::{Entity, EntityKind, MediaKind, Message, User};
//! use chrono::Utc;
//!
//! let channel = Entity::channel(1001, "OSINT News").with_username("osintnews");
//! assert_eq!(channel.kind, EntityKind::Channel);
//!
//! let alice = User::new(42).with_first_name("Alice");
//! let msg = Message::new(7, Utc::now())
//!     .with_sender(alice)
//!     .with_text("hello");
//! assert_eq!(msg.media, MediaKind::None);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a resolved entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A user or bot account
    User,
    /// A basic group or megagroup
    Group,
    /// A broadcast channel
    Channel,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::User => write!(f, "user"),
            EntityKind::Group => write!(f, "group"),
            EntityKind::Channel => write!(f, "channel"),
        }
    }
}

/// A resolved reference to a user, group, or channel.
///
/// Immutable for the lifetime of a run once resolved. Group and channel
/// entities carry a `title`; user entities carry the name and phone fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Platform identifier
    pub id: i64,

    /// What kind of entity this is
    pub kind: EntityKind,

    /// Display title (groups and channels)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Public handle without the leading `@`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Phone number, when visible to the requesting account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Entity {
    fn bare(id: i64, kind: EntityKind) -> Self {
        Self {
            id,
            kind,
            title: None,
            username: None,
            first_name: None,
            last_name: None,
            phone: None,
        }
    }

    /// Creates a group entity.
    pub fn group(id: i64, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::bare(id, EntityKind::Group)
        }
    }

    /// Creates a channel entity.
    pub fn channel(id: i64, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::bare(id, EntityKind::Channel)
        }
    }

    /// Creates a user entity from a [`User`].
    pub fn user(user: User) -> Self {
        Self {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            ..Self::bare(user.id, EntityKind::User)
        }
    }

    /// Sets the public handle.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Returns `true` if this entity is a user account.
    pub fn is_user(&self) -> bool {
        self.kind == EntityKind::User
    }

    /// Returns the user view of this entity, if it is one.
    pub fn as_user(&self) -> Option<User> {
        self.is_user().then(|| User {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        })
    }

    /// Name used for output files: title, then handle, then numeric id.
    pub fn output_name(&self) -> String {
        non_empty(self.title.as_deref())
            .or_else(|| non_empty(self.username.as_deref()))
            .map(ToString::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// A platform user: a message sender or a participant of a group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl User {
    /// Creates a user with only an id.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// First and last name joined by a space, trimmed. Empty when both are absent.
    ///
    /// ```
    /// use tgspyder::message::User;
    ///
    /// let user = User::new(1).with_first_name("Ada").with_last_name("Lovelace");
    /// assert_eq!(user.full_name(), "Ada Lovelace");
    /// assert_eq!(User::new(2).with_last_name("Solo").full_name(), "Solo");
    /// ```
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    /// Public profile link, `https://t.me/<username>`, if the user has a handle.
    pub fn profile_link(&self) -> Option<String> {
        non_empty(self.username.as_deref()).map(|u| format!("https://t.me/{u}"))
    }
}

/// Media marker carried by a message.
///
/// The collaborator adapter decides the variant; a document whose
/// attributes mark it as a sticker arrives as [`MediaKind::Sticker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// No media attached
    #[default]
    None,
    Photo,
    Sticker,
    /// Any document that is not a sticker
    Document,
    /// Any other media (geo, poll, contact, web page, ...)
    Other,
}

/// One message of an entity's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Monotonically increasing id scoped to the entity
    pub id: i64,

    /// When the message was sent
    pub date: DateTime<Utc>,

    /// Author; `None` for broadcast posts signed by the channel itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<User>,

    /// Message text, possibly empty
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub media: MediaKind,
}

impl Message {
    /// Creates an empty message with no sender, text, or media.
    pub fn new(id: i64, date: DateTime<Utc>) -> Self {
        Self {
            id,
            date,
            sender: None,
            text: String::new(),
            media: MediaKind::None,
        }
    }

    #[must_use]
    pub fn with_sender(mut self, sender: User) -> Self {
        self.sender = Some(sender);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_media(mut self, media: MediaKind) -> Self {
        self.media = media;
        self
    }
}

/// Sticker-pack metadata returned by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerSet {
    /// 64-bit set identifier
    pub id: i64,
    pub short_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub count: u32,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
