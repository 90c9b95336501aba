//! Invite-link extraction and per-run deduplication.
//!
//! Links match `(https?://)?t.me/(joinchat/|+)?[A-Za-z0-9_-]+`. A match
//! without a scheme gets `https://`, and trailing `.`, `,` and `)` are
//! stripped. Two links are the same entry only if the normalized strings are
//! byte-identical, so `t.me/+abc` and `t.me/joinchat/abc` stay distinct.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static INVITE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?t\.me/(?:joinchat/|\+)?[A-Za-z0-9_-]+")
        .expect("invite link pattern is valid")
});

/// Normalizes one raw match into its canonical form.
pub fn normalize_link(raw: &str) -> String {
    let link = if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    link.trim()
        .trim_end_matches(['.', ',', ')'])
        .to_string()
}

/// Extracts every link in `text`, normalized, in order of appearance.
///
/// Duplicates within the text are kept; see [`InviteLinkSet`] for dedup.
///
/// ```
/// use tgspyder::core::extract_invite_links;
///
/// let links = extract_invite_links("join t.me/+abc123 or https://t.me/joinchat/XYZ");
/// assert_eq!(links, vec!["https://t.me/+abc123", "https://t.me/joinchat/XYZ"]);
/// ```
pub fn extract_invite_links(text: &str) -> Vec<String> {
    INVITE_LINK
        .find_iter(text)
        .map(|m| normalize_link(m.as_str()))
        .collect()
}

/// Links seen during one run, in first-discovery order.
#[derive(Debug, Clone, Default)]
pub struct InviteLinkSet {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl InviteLinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts links from `text` and returns those not seen before in this set.
    ///
    /// ```
    /// use tgspyder::core::InviteLinkSet;
    ///
    /// let mut links = InviteLinkSet::new();
    /// assert_eq!(links.insert_from_text("t.me/+a and t.me/+a"), vec!["https://t.me/+a"]);
    /// assert!(links.insert_from_text("again: https://t.me/+a.").is_empty());
    /// ```
    pub fn insert_from_text(&mut self, text: &str) -> Vec<String> {
        extract_invite_links(text)
            .into_iter()
            .filter(|link| self.insert(link))
            .collect()
    }

    /// Records one canonical link. Returns `true` if it was new.
    pub fn insert(&mut self, link: &str) -> bool {
        if self.seen.contains(link) {
            return false;
        }
        self.seen.insert(link.to_string());
        self.order.push(link.to_string());
        true
    }

    pub fn contains(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Links in first-discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
