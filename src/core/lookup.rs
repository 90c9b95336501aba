//! Read-only user lookup.

use std::fmt;

use tracing::{info, warn};

use crate::client::{ApiError, TelegramApi};
use crate::error::{Result, SpyderError};
use crate::message::{Entity, User};

/// Shown when the phone number is absent or hidden.
pub const HIDDEN_PHONE: &str = "[hidden/none]";

const NONE: &str = "[none]";

/// How an identifier is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserQuery<'a> {
    /// Handle without the leading `@`
    Handle(&'a str),
    /// Numeric id
    Id(i64),
}

impl<'a> UserQuery<'a> {
    /// Classifies an identifier. `@name` and non-numeric input are handles;
    /// all-digit input is an id.
    ///
    /// ```
    /// use tgspyder::core::UserQuery;
    ///
    /// assert_eq!(UserQuery::parse("@durov"), UserQuery::Handle("durov"));
    /// assert_eq!(UserQuery::parse("durov"), UserQuery::Handle("durov"));
    /// assert_eq!(UserQuery::parse("777000"), UserQuery::Id(777000));
    /// ```
    pub fn parse(identifier: &'a str) -> Self {
        let raw = identifier.trim();
        if let Some(handle) = raw.strip_prefix('@') {
            return UserQuery::Handle(handle);
        }
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = raw.parse() {
                return UserQuery::Id(id);
            }
        }
        UserQuery::Handle(raw)
    }
}

/// Outcome of a lookup that reached an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Found(User),
    /// The identifier names a group or channel
    NotAUser(Entity),
}

impl UserLookup {
    pub fn user(&self) -> Option<&User> {
        match self {
            UserLookup::Found(user) => Some(user),
            UserLookup::NotAUser(_) => None,
        }
    }
}

/// Renders the lookup result block for a user.
pub struct UserReport<'a>(pub &'a User);

impl fmt::Display for UserReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = self.0;
        let username = user
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .map_or_else(|| NONE.to_string(), |u| format!("@{u}"));
        let name = user.full_name();
        let phone = user.phone.as_deref().filter(|p| !p.is_empty()).unwrap_or(HIDDEN_PHONE);

        writeln!(f, "ID:        {}", user.id)?;
        writeln!(f, "Username:  {username}")?;
        writeln!(f, "Name:      {}", if name.is_empty() { NONE } else { name.as_str() })?;
        write!(f, "Phone:     {phone}")?;
        if let Some(link) = user.profile_link() {
            write!(f, "\nProfile:   {link}")?;
        }
        Ok(())
    }
}

/// Resolves an identifier and reports whether it is a user.
///
/// A profile hidden by privacy limits yields
/// [`SpyderError::UnresolvableProfile`]; any other failure is a resolution
/// error carrying the identifier.
pub fn lookup_user(client: &dyn TelegramApi, identifier: &str) -> Result<UserLookup> {
    info!(identifier, "looking up user");

    let resolved = match UserQuery::parse(identifier) {
        UserQuery::Handle(handle) => client.resolve(handle),
        UserQuery::Id(id) => client.resolve_id(id),
    };

    let entity = resolved.map_err(|e| match e {
        ApiError::Unresolvable(id) => SpyderError::UnresolvableProfile { id },
        e => SpyderError::resolution(identifier.trim(), e),
    })?;

    Ok(match entity.as_user() {
        Some(user) => UserLookup::Found(user),
        None => {
            warn!(identifier, kind = %entity.kind, "identifier resolved but is not a user");
            UserLookup::NotAUser(entity)
        }
    })
}
