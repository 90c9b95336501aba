//! In-memory collaborator.
//!
//! Everything is scripted up front through [`MemoryClientBuilder`]. Useful for
//! tests and for embedding the pipeline over data fetched by other means.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::message::{Entity, Message, StickerSet, User};

use super::{ApiError, ApiResult, MessageStream, TelegramApi};

#[derive(Debug, Clone, Default)]
struct History {
    messages: Vec<Message>,
    fail_after: Option<(usize, ApiError)>,
}

/// Scripted [`TelegramApi`] implementation.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use tgspyder::client::{ApiError, MemoryClient, TelegramApi};
/// use tgspyder::message::{Entity, Message};
///
/// let chat = Entity::group(1, "Chat");
/// let client = MemoryClient::builder()
///     .entity("chat", chat.clone())
///     .messages(1, (1..=5).map(|id| Message::new(id, Utc::now())).collect())
///     .fail_stream_after(1, 2, ApiError::rpc(420, "FLOOD_WAIT_30"))
///     .build();
///
/// let pulled: Vec<_> = client.stream_messages(&chat).unwrap().collect();
/// assert_eq!(pulled.len(), 3);
/// assert!(pulled[2].is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    handles: HashMap<String, Entity>,
    by_id: HashMap<i64, Entity>,
    unresolvable: HashSet<i64>,
    invites: HashMap<String, ApiResult<Entity>>,
    participants: HashMap<i64, ApiResult<Vec<User>>>,
    histories: HashMap<i64, History>,
    sticker_sets: HashMap<String, StickerSet>,
}

impl MemoryClient {
    /// Starts a new builder.
    pub fn builder() -> MemoryClientBuilder {
        MemoryClientBuilder::default()
    }
}

impl TelegramApi for MemoryClient {
    fn name(&self) -> &'static str {
        "Memory"
    }

    fn resolve(&self, handle_or_link: &str) -> ApiResult<Entity> {
        let key = normalize_handle(handle_or_link);
        debug!(handle = %key, "resolving handle");
        self.handles
            .get(&key)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("username '{key}'")))
    }

    fn resolve_id(&self, id: i64) -> ApiResult<Entity> {
        if self.unresolvable.contains(&id) {
            return Err(ApiError::Unresolvable(id));
        }
        self.by_id
            .get(&id)
            .cloned()
            .ok_or(ApiError::Unresolvable(id))
    }

    fn import_invite(&self, code: &str) -> ApiResult<Entity> {
        self.invites
            .get(code)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::rpc(400, "INVITE_HASH_INVALID")))
    }

    fn list_participants(&self, entity: &Entity) -> ApiResult<Vec<User>> {
        self.participants
            .get(&entity.id)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::rpc(400, "CHAT_ADMIN_REQUIRED")))
    }

    fn stream_messages<'a>(&'a self, entity: &Entity) -> ApiResult<MessageStream<'a>> {
        let history = self
            .histories
            .get(&entity.id)
            .ok_or_else(|| ApiError::rpc(400, "CHANNEL_INVALID"))?;

        let limit = history
            .fail_after
            .as_ref()
            .map_or(history.messages.len(), |(n, _)| *n);
        let failure = history
            .fail_after
            .as_ref()
            .map(|(_, err)| Err(err.clone()));

        let iter = history
            .messages
            .iter()
            .take(limit)
            .cloned()
            .map(Ok)
            .chain(failure);

        Ok(Box::new(iter))
    }

    fn fetch_sticker_set(&self, short_name: &str) -> ApiResult<StickerSet> {
        self.sticker_sets
            .get(short_name)
            .cloned()
            .ok_or_else(|| ApiError::rpc(400, "STICKERSET_INVALID"))
    }
}

/// Builder for [`MemoryClient`].
#[derive(Debug, Default)]
pub struct MemoryClientBuilder {
    client: MemoryClient,
}

impl MemoryClientBuilder {
    /// Registers an entity under a handle (leading `@` ignored) and under its id.
    #[must_use]
    pub fn entity(mut self, handle: &str, entity: Entity) -> Self {
        self.client
            .by_id
            .insert(entity.id, entity.clone());
        self.client
            .handles
            .insert(normalize_handle(handle), entity);
        self
    }

    /// Registers an entity reachable only by numeric id.
    #[must_use]
    pub fn entity_by_id(mut self, entity: Entity) -> Self {
        self.client.by_id.insert(entity.id, entity);
        self
    }

    /// Marks an id as existing but hidden from this account.
    #[must_use]
    pub fn unresolvable(mut self, id: i64) -> Self {
        self.client.unresolvable.insert(id);
        self
    }

    /// Scripts the outcome of importing an invite code.
    #[must_use]
    pub fn invite(mut self, code: &str, outcome: ApiResult<Entity>) -> Self {
        self.client.invites.insert(code.to_string(), outcome);
        self
    }

    /// Scripts the participant list of an entity.
    #[must_use]
    pub fn participants(mut self, entity_id: i64, outcome: ApiResult<Vec<User>>) -> Self {
        self.client.participants.insert(entity_id, outcome);
        self
    }

    /// Sets the message history of an entity, oldest first.
    #[must_use]
    pub fn messages(mut self, entity_id: i64, messages: Vec<Message>) -> Self {
        self.client.histories.entry(entity_id).or_default().messages = messages;
        self
    }

    /// Makes the history stream of an entity fail after `delivered` messages.
    #[must_use]
    pub fn fail_stream_after(mut self, entity_id: i64, delivered: usize, error: ApiError) -> Self {
        self.client.histories.entry(entity_id).or_default().fail_after = Some((delivered, error));
        self
    }

    /// Registers a sticker set under its short name.
    #[must_use]
    pub fn sticker_set(mut self, set: StickerSet) -> Self {
        self.client.sticker_sets.insert(set.short_name.clone(), set);
        self
    }

    pub fn build(self) -> MemoryClient {
        self.client
    }
}

/// Strips `@`, a `t.me/` link prefix, and surrounding whitespace from a handle.
pub(crate) fn normalize_handle(input: &str) -> String {
    let trimmed = input.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let without_host = without_scheme
        .strip_prefix("t.me/")
        .unwrap_or(without_scheme);
    without_host
        .trim_start_matches('@')
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle("@alice"), "alice");
        assert_eq!(normalize_handle(" https://t.me/alice/ "), "alice");
        assert_eq!(normalize_handle("t.me/alice"), "alice");
        assert_eq!(normalize_handle("alice"), "alice");
    }

    #[test]
    fn test_resolve_by_handle_and_id() {
        let client = MemoryClient::builder()
            .entity("@news", Entity::channel(3, "News"))
            .build();

        assert_eq!(client.resolve("news").unwrap().id, 3);
        assert_eq!(client.resolve("https://t.me/news").unwrap().id, 3);
        assert_eq!(client.resolve_id(3).unwrap().id, 3);
        assert!(matches!(client.resolve("other"), Err(ApiError::NotFound(_))));
        assert_eq!(client.resolve_id(4), Err(ApiError::Unresolvable(4)));
    }

    #[test]
    fn test_unknown_invite_is_rpc_error() {
        let client = MemoryClient::default();
        assert!(matches!(
            client.import_invite("nope"),
            Err(ApiError::Rpc { .. })
        ));
    }

    #[test]
    fn test_stream_without_failure_yields_all() {
        let chat = Entity::group(1, "Chat");
        let client = MemoryClient::builder()
            .messages(1, (1..=4).map(|id| Message::new(id, Utc::now())).collect())
            .build();

        let ids: Vec<i64> = client
            .stream_messages(&chat)
            .unwrap()
            .map(|m| m.unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_stream_unknown_entity_fails_to_open() {
        let client = MemoryClient::default();
        assert!(client.stream_messages(&Entity::group(9, "x")).is_err());
    }
}
