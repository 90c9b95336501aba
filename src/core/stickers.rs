//! Sticker-pack creator inference.

use std::fmt;

use tracing::{debug, info, warn};
use url::Url;

use crate::client::{ApiError, TelegramApi};
use crate::error::{Result, SpyderError};
use crate::message::{Entity, StickerSet, User};

const PACK_NAME: &str = "sticker pack short name";

/// Extracts the pack short name from a link or a bare name.
///
/// Links are anything starting with `http://`/`https://` or containing
/// `t.me/`. For links the short name is the second path segment when there
/// are at least two, else the first. Anything else is taken up to the first
/// whitespace.
///
/// ```
/// use tgspyder::core::parse_pack_reference;
///
/// assert_eq!(parse_pack_reference("https://t.me/addstickers/CoolCats").unwrap(), "CoolCats");
/// assert_eq!(parse_pack_reference("t.me/CoolCats").unwrap(), "CoolCats");
/// assert_eq!(parse_pack_reference("CoolCats please").unwrap(), "CoolCats");
/// assert!(parse_pack_reference("https://t.me/").is_err());
/// ```
pub fn parse_pack_reference(input: &str) -> Result<String> {
    let raw = input.trim();
    let is_link = raw.starts_with("http://") || raw.starts_with("https://") || raw.contains("t.me/");

    if !is_link {
        return raw
            .split_whitespace()
            .next()
            .map(str::to_string)
            .ok_or_else(|| SpyderError::parse(PACK_NAME, input, "input is empty"));
    }

    let absolute = if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("https://{}", raw.trim_start_matches('/'))
    };
    let url = Url::parse(&absolute).map_err(|e| SpyderError::parse(PACK_NAME, input, e.to_string()))?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let name = match segments.as_slice() {
        [_, second, ..] => *second,
        [only] => *only,
        [] => return Err(SpyderError::parse(PACK_NAME, input, "link has no path")),
    };
    Ok(name.to_string())
}

/// Infers the creator's user id from a sticker set id: the upper 32 bits.
///
/// This mirrors how the platform currently packs owner ids into set ids. It
/// is an inference, not a documented mapping.
///
/// ```
/// use tgspyder::core::creator_id;
///
/// assert_eq!(creator_id((1234_i64 << 32) | 5678), 1234);
/// ```
pub fn creator_id(set_id: i64) -> i64 {
    set_id >> 32
}

/// What the creator id resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorProfile {
    /// A user profile
    Resolved(User),
    /// An entity that is not a user
    NotAUser(Entity),
    /// Hidden by privacy limits
    Unresolvable,
}

/// Result of a sticker-pack lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickerPackReport {
    /// The raw input
    pub input: String,
    pub short_name: String,
    pub set: StickerSet,
    /// Inferred via [`creator_id`]
    pub creator_id: i64,
    pub creator: CreatorProfile,
}

impl fmt::Display for StickerPackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sticker pack:    {} ({})", self.set.title, self.short_name)?;
        writeln!(f, "Stickers:        {}", self.set.count)?;
        write!(f, "Creator ID:      {} (inferred)", self.creator_id)?;
        match &self.creator {
            CreatorProfile::Resolved(user) => {
                if let Some(username) = &user.username {
                    write!(f, "\nCreator username: @{username}")?;
                }
                let name = user.full_name();
                if !name.is_empty() {
                    write!(f, "\nCreator name:    {name}")?;
                }
                Ok(())
            }
            CreatorProfile::NotAUser(entity) => {
                write!(f, "\nCreator id resolved to a {} ({})", entity.kind, entity.output_name())
            }
            CreatorProfile::Unresolvable => {
                write!(f, "\nCreator profile could not be resolved (Telegram limitation)")
            }
        }
    }
}

/// Fetches a sticker pack and resolves its inferred creator.
///
/// A creator hidden by privacy limits is reported as
/// [`CreatorProfile::Unresolvable`], not as an error.
pub fn resolve_sticker_pack(client: &dyn TelegramApi, input: &str) -> Result<StickerPackReport> {
    let short_name = parse_pack_reference(input)?;
    info!(input, short_name = %short_name, "resolving sticker pack");

    let set = client
        .fetch_sticker_set(&short_name)
        .map_err(|e| SpyderError::resolution(short_name.clone(), e))?;

    let creator_id = creator_id(set.id);
    debug!(set_id = set.id, creator_id, "inferred creator id");

    let creator = match client.resolve_id(creator_id) {
        Ok(entity) => match entity.as_user() {
            Some(user) => CreatorProfile::Resolved(user),
            None => CreatorProfile::NotAUser(entity),
        },
        Err(ApiError::Unresolvable(_)) => {
            warn!(creator_id, "creator profile could not be resolved");
            CreatorProfile::Unresolvable
        }
        Err(e) => {
            return Err(SpyderError::remote(
                "resolving creator of",
                short_name,
                e,
            ));
        }
    };

    Ok(StickerPackReport {
        input: input.to_string(),
        short_name,
        set,
        creator_id,
        creator,
    })
}
