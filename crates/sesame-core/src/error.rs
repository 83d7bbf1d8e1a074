// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every authentication driver.

use thiserror::Error;

/// The error type returned by all driver traits and the [`AuthDriver`](crate::AuthDriver) wrapper.
///
/// A driver returns on the first failure; no partially populated
/// [`UserInfo`](crate::UserInfo) is ever produced alongside an error.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or missing input (missing `code`/`state`, weak password, invalid email).
    ///
    /// Recoverable by re-prompting the user.
    #[error("wrong request: {0}")]
    WrongRequest(String),

    /// Identity claims failed a trust check (e.g. unverified OIDC email).
    #[error("invalid user: {0}")]
    InvalidUser(String),

    /// Opaque provider or network failure (non-200 response, transport error, decode failure).
    #[error("{message}")]
    Unknown {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The driver does not accept new accounts.
    #[error("signup is disabled for this provider")]
    SignupDisabled,

    /// Driver construction failed because of invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification of an [`AuthError`], used by callers to map errors to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    WrongRequest,
    InvalidUser,
    Unknown,
    SignupDisabled,
    Config,
}

impl AuthError {
    /// Build an [`AuthError::Unknown`] wrapping the underlying cause.
    pub fn unknown(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AuthError::Unknown {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build an [`AuthError::Unknown`] with no underlying cause.
    pub fn unknown_msg(message: impl Into<String>) -> Self {
        AuthError::Unknown {
            message: message.into(),
            source: None,
        }
    }

    /// Build the error returned when a request field is absent, empty, or not a string.
    pub fn missing_field(name: &str) -> Self {
        AuthError::WrongRequest(format!("missing or invalid field `{name}`"))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::WrongRequest(_) => ErrorKind::WrongRequest,
            AuthError::InvalidUser(_) => ErrorKind::InvalidUser,
            AuthError::Unknown { .. } => ErrorKind::Unknown,
            AuthError::SignupDisabled => ErrorKind::SignupDisabled,
            AuthError::Config(_) => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            AuthError::WrongRequest("x".into()).kind(),
            ErrorKind::WrongRequest
        );
        assert_eq!(
            AuthError::InvalidUser("x".into()).kind(),
            ErrorKind::InvalidUser
        );
        assert_eq!(AuthError::unknown_msg("x").kind(), ErrorKind::Unknown);
        assert_eq!(AuthError::SignupDisabled.kind(), ErrorKind::SignupDisabled);
        assert_eq!(AuthError::Config("x".into()).kind(), ErrorKind::Config);
    }

    #[test]
    fn unknown_keeps_source() {
        let err = AuthError::unknown("token exchange failed", std::io::Error::other("reset"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("reset"));
        match err {
            AuthError::Unknown { message, source } => {
                assert_eq!(message, "token exchange failed");
                assert_eq!(source.unwrap().to_string(), "reset");
            }
            other => panic!("expected Unknown, got: {other:?}"),
        }
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = AuthError::missing_field("code");
        assert_eq!(err.to_string(), "wrong request: missing or invalid field `code`");
    }
}
