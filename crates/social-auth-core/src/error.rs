// Error taxonomy for the social-login dispatch flow.
//
// Every terminal failure the filter can reach maps to an `ErrorCode`, which
// is what gets attached to the failure-URL redirect as a query parameter.
// `SocialAuthError` is the richer internal error carrying context.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable failure codes surfaced to the failure URL.
///
/// Serialized in SCREAMING_SNAKE_CASE so they are safe to embed in a query
/// string and to match on from a frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownProvider,
    ProviderAuthDenied,
    DuplicateConnection,
    AmbiguousAccount,
    SessionUnavailable,
    AuthenticationFailed,
    StorageFailure,
    InternalServerError,
}

impl ErrorCode {
    /// The query-parameter form of the code, e.g. `UNKNOWN_PROVIDER`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownProvider => "UNKNOWN_PROVIDER",
            Self::ProviderAuthDenied => "PROVIDER_AUTH_DENIED",
            Self::DuplicateConnection => "DUPLICATE_CONNECTION",
            Self::AmbiguousAccount => "AMBIGUOUS_ACCOUNT",
            Self::SessionUnavailable => "SESSION_UNAVAILABLE",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::StorageFailure => "STORAGE_FAILURE",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::UnknownProvider => "No provider registered for this id",
            Self::ProviderAuthDenied => "Provider reported denial or cancellation",
            Self::DuplicateConnection => "External account already connected to another user",
            Self::AmbiguousAccount => "External account maps to more than one local user",
            Self::SessionUnavailable => "No session available to record the sign-in attempt",
            Self::AuthenticationFailed => "Authentication manager rejected the token",
            Self::StorageFailure => "Connection storage failure",
            Self::InternalServerError => "Internal server error",
        };
        write!(f, "{msg}")
    }
}

/// Internal error for the dispatch flow.
///
/// Collaborator failures (storage, authentication manager) are wrapped, not
/// retried; the filter's failure handler converts whatever reaches it into a
/// redirect carrying `code()`.
#[derive(Debug, thiserror::Error)]
pub enum SocialAuthError {
    #[error("no provider registered for '{provider_id}'")]
    UnknownProvider { provider_id: String },

    #[error("provider '{provider_id}' denied the authentication attempt")]
    ProviderAuthDenied { provider_id: String },

    #[error("connection {provider_id}/{provider_user_id} already belongs to another user")]
    DuplicateConnection {
        provider_id: String,
        provider_user_id: String,
    },

    #[error("external identity {provider_id}/{provider_user_id} matches {match_count} local users")]
    AmbiguousAccount {
        provider_id: String,
        provider_user_id: String,
        match_count: usize,
    },

    #[error("no session available to record the sign-in attempt")]
    SessionUnavailable,

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("connection storage failure: {0}")]
    Storage(String),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl SocialAuthError {
    /// The stable code attached to the failure redirect.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownProvider { .. } => ErrorCode::UnknownProvider,
            Self::ProviderAuthDenied { .. } => ErrorCode::ProviderAuthDenied,
            Self::DuplicateConnection { .. } => ErrorCode::DuplicateConnection,
            Self::AmbiguousAccount { .. } => ErrorCode::AmbiguousAccount,
            Self::SessionUnavailable => ErrorCode::SessionUnavailable,
            Self::AuthenticationFailed(_) => ErrorCode::AuthenticationFailed,
            Self::Storage(_) => ErrorCode::StorageFailure,
            Self::Other(_) | Self::Anyhow(_) => ErrorCode::InternalServerError,
        }
    }
}

/// Unified result type for social-auth operations.
pub type Result<T> = std::result::Result<T, SocialAuthError>;
