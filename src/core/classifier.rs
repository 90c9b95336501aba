//! Content classification: what text a message contributes to the transcript.

use crate::message::{MediaKind, Message};

/// Label written for a photo without caption.
pub const PHOTO_LABEL: &str = "[Photo]";
/// Label written for a sticker.
pub const STICKER_LABEL: &str = "[Sticker]";
/// Label written for a document without caption.
pub const DOCUMENT_LABEL: &str = "[Document]";
/// Label written for any other media.
pub const MEDIA_LABEL: &str = "[Media]";

/// Result of classifying one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// `true` when `text` is a media placeholder rather than message text
    pub is_media: bool,
    pub text: String,
}

impl Classification {
    /// Returns `true` if the classification carries real message text.
    pub fn has_text(&self) -> bool {
        !self.is_media && !self.text.is_empty()
    }
}

/// Returns the placeholder for a media kind, or `None` for [`MediaKind::None`].
pub fn media_label(media: MediaKind) -> Option<&'static str> {
    match media {
        MediaKind::None => None,
        MediaKind::Photo => Some(PHOTO_LABEL),
        MediaKind::Sticker => Some(STICKER_LABEL),
        MediaKind::Document => Some(DOCUMENT_LABEL),
        MediaKind::Other => Some(MEDIA_LABEL),
    }
}

/// Classifies a message.
///
/// Non-empty text wins; otherwise the media kind picks a placeholder;
/// otherwise the text is empty.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use tgspyder::core::classify;
/// use tgspyder::message::{MediaKind, Message};
///
/// let captioned = Message::new(1, Utc::now()).with_text("look").with_media(MediaKind::Photo);
/// assert_eq!(classify(&captioned).text, "look");
///
/// let bare = Message::new(2, Utc::now()).with_media(MediaKind::Photo);
/// assert_eq!(classify(&bare).text, "[Photo]");
/// ```
pub fn classify(message: &Message) -> Classification {
    if !message.text.is_empty() {
        return Classification {
            is_media: false,
            text: message.text.clone(),
        };
    }

    match media_label(message.media) {
        Some(label) => Classification {
            is_media: true,
            text: label.to_string(),
        },
        None => Classification {
            is_media: false,
            text: String::new(),
        },
    }
}
