//! Error kinds reported by the collaborator client.

use thiserror::Error;

/// Result type for collaborator calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Outcome kinds a collaborator call can report instead of a value.
///
/// The pipeline inspects the variant to decide whether to fall back,
/// continue, or abort; nothing is signalled by unwinding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No entity, sticker set, or invite matches the request
    #[error("{0} not found")]
    NotFound(String),

    /// The account already joined the chat behind an invite
    #[error("already a participant of this chat")]
    AlreadyParticipant,

    /// The id exists but cannot be turned into a profile (privacy limits)
    #[error("entity {0} cannot be resolved by this account")]
    Unresolvable(i64),

    /// The remote side rejected the request
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// Remote error code
        code: i32,
        /// Remote error message, e.g. `CHANNEL_PRIVATE`
        message: String,
    },

    /// Anything else
    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    /// Creates an RPC error.
    pub fn rpc(code: i32, message: impl Into<String>) -> Self {
        ApiError::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Returns `true` for [`ApiError::AlreadyParticipant`].
    pub fn is_already_participant(&self) -> bool {
        matches!(self, ApiError::AlreadyParticipant)
    }

    /// Returns `true` for [`ApiError::Unresolvable`].
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, ApiError::Unresolvable(_))
    }
}
