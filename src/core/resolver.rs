//! Entity resolution for user-supplied targets.

use tracing::{debug, info};

use crate::client::{ApiError, TelegramApi};
use crate::error::{Result, SpyderError};
use crate::message::Entity;

/// Returns `true` if the target has the shape of a private invite link.
///
/// ```
/// use tgspyder::core::is_invite_link;
///
/// assert!(is_invite_link("https://t.me/+AbC123"));
/// assert!(is_invite_link("t.me/joinchat/AbC123"));
/// assert!(!is_invite_link("https://t.me/durov"));
/// ```
pub fn is_invite_link(target: &str) -> bool {
    target.contains("joinchat") || target.starts_with("https://t.me/+") || target.starts_with("t.me/+")
}

/// Extracts the invite code: the last path segment without a leading `+`.
///
/// ```
/// use tgspyder::core::invite_code;
///
/// assert_eq!(invite_code("https://t.me/+AbC123"), "AbC123");
/// assert_eq!(invite_code("t.me/joinchat/XyZ"), "XyZ");
/// ```
pub fn invite_code(target: &str) -> &str {
    let last = target.rsplit('/').next().unwrap_or(target);
    last.strip_prefix('+').unwrap_or(last)
}

/// Resolves a target (handle, public link, or invite link) to an entity.
///
/// Invite links are imported first. If the account is already a participant,
/// or the import yields no chat, the target is looked up like any handle.
pub fn resolve_target(client: &dyn TelegramApi, target: &str) -> Result<Entity> {
    let target = target.trim();
    info!(target, "resolving target");

    if is_invite_link(target) {
        let code = invite_code(target);
        debug!(code, "target is an invite link, importing");

        match client.import_invite(code) {
            Ok(entity) => return Ok(entity),
            Err(ApiError::AlreadyParticipant) => {
                debug!(code, "already a participant, falling back to lookup");
            }
            Err(ApiError::NotFound(_)) => {
                debug!(code, "import returned no chat, falling back to lookup");
            }
            Err(e) => return Err(SpyderError::resolution(target, e)),
        }
    }

    client
        .resolve(target)
        .map_err(|e| SpyderError::resolution(target, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryClient;

    #[test]
    fn test_invite_shapes() {
        assert!(is_invite_link("https://t.me/joinchat/abc"));
        assert!(is_invite_link("t.me/+abc"));
        assert!(!is_invite_link("http://t.me/+abc"));
        assert!(!is_invite_link("@channel"));
    }

    #[test]
    fn test_invite_code_without_path() {
        assert_eq!(invite_code("+abc"), "abc");
        assert_eq!(invite_code("joinchat"), "joinchat");
    }

    #[test]
    fn test_plain_handle() {
        let client = MemoryClient::builder()
            .entity("osint", Entity::group(1, "OSINT"))
            .build();
        assert_eq!(resolve_target(&client, " @osint ").unwrap().id, 1);
    }

    #[test]
    fn test_invite_import_success() {
        let client = MemoryClient::builder()
            .invite("abc123", Ok(Entity::group(2, "Private")))
            .build();
        assert_eq!(resolve_target(&client, "https://t.me/+abc123").unwrap().id, 2);
    }

    #[test]
    fn test_already_participant_falls_back_to_lookup() {
        let client = MemoryClient::builder()
            .invite("abc123", Err(ApiError::AlreadyParticipant))
            .entity("t.me/+abc123", Entity::group(3, "Joined"))
            .build();
        assert_eq!(resolve_target(&client, "t.me/+abc123").unwrap().id, 3);
    }

    #[test]
    fn test_import_failure_is_resolution_error() {
        let client = MemoryClient::builder()
            .invite("expired", Err(ApiError::rpc(400, "INVITE_HASH_EXPIRED")))
            .build();
        let err = resolve_target(&client, "t.me/+expired").unwrap_err();
        assert!(err.is_resolution());
        assert!(err.to_string().contains("INVITE_HASH_EXPIRED"));
        assert!(err.to_string().contains("t.me/+expired"));
    }

    #[test]
    fn test_unknown_handle() {
        let client = MemoryClient::default();
        let err = resolve_target(&client, "ghost").unwrap_err();
        assert!(matches!(
            err.api_error(),
            Some(ApiError::NotFound(_))
        ));
    }
}
