//! The collaborator seam.
//!
//! Every call the pipeline makes into the messaging platform goes through
//! [`TelegramApi`]. Calls are blocking from the pipeline's point of view;
//! an implementation is free to drive async I/O internally.

use crate::message::{Entity, Message, StickerSet, User};

use super::ApiResult;

/// Lazy, finite, non-restartable sequence of messages in delivery order.
///
/// Yielding `Err` means the remote source failed; consumers stop pulling.
pub type MessageStream<'a> = Box<dyn Iterator<Item = ApiResult<Message>> + 'a>;

/// Client for the messaging platform.
///
/// # Examples
///
/// ```
/// use tgspyder::client::{MemoryClient, TelegramApi};
/// use tgspyder::message::Entity;
///
/// let client = MemoryClient::builder()
///     .entity("osint", Entity::channel(10, "OSINT"))
///     .build();
///
/// let entity = client.resolve("osint").unwrap();
/// assert_eq!(entity.id, 10);
/// ```
pub trait TelegramApi {
    /// Human-readable name of this client.
    fn name(&self) -> &'static str;

    /// Resolves a handle (with or without `@`) or public link to an entity.
    fn resolve(&self, handle_or_link: &str) -> ApiResult<Entity>;

    /// Resolves a numeric id. Reports [`ApiError::Unresolvable`](super::ApiError::Unresolvable)
    /// when the id is known to exist but hidden from this account.
    fn resolve_id(&self, id: i64) -> ApiResult<Entity>;

    /// Joins a chat through an invite code (without `+` or `joinchat/`).
    fn import_invite(&self, code: &str) -> ApiResult<Entity>;

    /// Fetches the full participant list in one call.
    fn list_participants(&self, entity: &Entity) -> ApiResult<Vec<User>>;

    /// Opens the message history, oldest message first.
    fn stream_messages<'a>(&'a self, entity: &Entity) -> ApiResult<MessageStream<'a>>;

    /// Fetches a sticker set by short name.
    fn fetch_sticker_set(&self, short_name: &str) -> ApiResult<StickerSet>;
}
