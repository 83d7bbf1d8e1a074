// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-shape validation for the local password flows.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info};

use sesame_core::{AccountFlows, AuthError, Driver, SigninRequest, UserInfo};

/// Longest password accepted; longer inputs are rejected before strength scoring.
pub const MAX_PASSWORD_LENGTH: usize = 256;

/// Minimum zxcvbn score (0-4) a new password must reach.
pub const MIN_PASSWORD_SCORE: u8 = 3;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$")
        .unwrap()
});

/// Local driver settings.
#[derive(Debug, Clone, Default)]
pub struct LocalConfig {
    /// Email domains allowed to sign up. Empty means any domain.
    pub allowed_domains: Vec<String>,
}

/// Driver for accounts stored by the caller itself.
#[derive(Debug, Clone, Default)]
pub struct LocalDriver {
    allowed_domains: Vec<String>,
}

impl LocalDriver {
    pub fn new(config: LocalConfig) -> Self {
        let allowed_domains: Vec<String> = config
            .allowed_domains
            .into_iter()
            .map(|d| d.trim().trim_start_matches('@').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        info!(allowed_domains = allowed_domains.len(), "local driver configured");
        Self { allowed_domains }
    }

    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    /// Whether `email` belongs to one of the allowed signup domains.
    ///
    /// The address must contain exactly one `@` and its domain part must equal
    /// an allowed domain; subdomains do not match.
    pub fn is_allowed_domain(&self, email: &str) -> bool {
        if self.allowed_domains.is_empty() {
            return true;
        }
        let mut parts = email.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };
        if local.is_empty() {
            return false;
        }
        self.allowed_domains
            .iter()
            .any(|allowed| domain.eq_ignore_ascii_case(allowed))
    }
}

#[async_trait]
impl Driver for LocalDriver {
    /// The caller already holds the account; nothing to fetch.
    async fn user_info_from_driver(&self, _req: &SigninRequest) -> Result<UserInfo, AuthError> {
        Ok(UserInfo::default())
    }

    /// Signin needs a username and password; strength is not checked here.
    fn check_signin_request(&self, req: &SigninRequest) -> Result<(), AuthError> {
        req.string("username")?;
        req.string("password")?;
        Ok(())
    }

    fn as_account_flows(&self) -> Option<&dyn AccountFlows> {
        Some(self)
    }
}

impl AccountFlows for LocalDriver {
    /// Validate a signup request: `fullname`, `username`, an allowed `email`,
    /// and a strong `password`.
    fn check_signup_request(&self, req: &SigninRequest) -> Result<(), AuthError> {
        req.string("fullname")?;
        req.string("username")?;

        let email = req.string("email")?;
        check_email(&email)?;
        if !self.is_allowed_domain(&email) {
            return Err(AuthError::WrongRequest(
                "email domain is not allowed to sign up".to_string(),
            ));
        }

        check_password_strength(&req.string("password")?)
    }

    /// Validate an email verification request.
    fn check_verify_request(&self, req: &SigninRequest) -> Result<(), AuthError> {
        req.string("token").map(|_| ())
    }

    /// Validate a password reset request (first step).
    fn check_ask_reset_request(&self, req: &SigninRequest) -> Result<(), AuthError> {
        check_email(&req.string("email")?)
    }

    /// Validate a password reset confirmation.
    fn check_reset_request(&self, req: &SigninRequest) -> Result<(), AuthError> {
        req.string("token")?;
        check_password_strength(&req.string("password")?)
    }
}

fn check_email(email: &str) -> Result<(), AuthError> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(AuthError::WrongRequest("invalid email address".to_string()));
    }
    Ok(())
}

/// Reject passwords that are too long or too guessable.
pub(crate) fn check_password_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WrongRequest(format!(
            "password must not exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    let score = u8::from(zxcvbn::zxcvbn(password, &[]).score());
    if score < MIN_PASSWORD_SCORE {
        debug!(score, "password rejected as too weak");
        return Err(AuthError::WrongRequest("password is too weak".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG: &str = "xK9#mQ2$vL7!pR4z-Tanager";

    fn driver(domains: &[&str]) -> LocalDriver {
        LocalDriver::new(LocalConfig {
            allowed_domains: domains.iter().map(|d| d.to_string()).collect(),
        })
    }

    fn signup(email: &str, password: &str) -> SigninRequest {
        SigninRequest::new()
            .with("fullname", "Bob Builder")
            .with("username", "bob")
            .with("email", email)
            .with("password", password)
    }

    #[test]
    fn allowed_domain_matches_on_boundary() {
        let d = driver(&["example.com"]);
        assert!(d.is_allowed_domain("user@example.com"));
        assert!(d.is_allowed_domain("user@EXAMPLE.com"));
        assert!(!d.is_allowed_domain("user@sub.example.com"));
        assert!(!d.is_allowed_domain("user@badexample.com"));
        assert!(!d.is_allowed_domain("a@b@example.com"));
        assert!(!d.is_allowed_domain("example.com"));
        assert!(!d.is_allowed_domain("@example.com"));
    }

    #[test]
    fn empty_allow_list_accepts_any_domain() {
        let d = driver(&[]);
        assert!(d.is_allowed_domain("user@anywhere.org"));
    }

    #[test]
    fn configured_domains_are_normalized() {
        let d = driver(&[" @Example.COM ", ""]);
        assert_eq!(d.allowed_domains(), ["example.com".to_string()]);
    }

    #[test]
    fn weak_password_is_rejected() {
        let err = check_password_strength("password").unwrap_err();
        assert!(matches!(err, AuthError::WrongRequest(ref m) if m.contains("weak")));
    }

    #[test]
    fn long_password_fails_on_length_alone() {
        let long = "aB3$".repeat(75);
        assert_eq!(long.len(), 300);
        let err = check_password_strength(&long).unwrap_err();
        assert!(matches!(err, AuthError::WrongRequest(ref m) if m.contains("256")));
    }

    #[test]
    fn strong_password_passes() {
        assert!(check_password_strength(STRONG).is_ok());
    }

    #[test]
    fn signup_happy_path() {
        let d = driver(&["example.com"]);
        d.check_signup_request(&signup("bob@example.com", STRONG))
            .unwrap();
    }

    #[test]
    fn signup_rejects_each_missing_field() {
        let d = driver(&[]);
        for field in ["fullname", "username", "email", "password"] {
            let mut req = SigninRequest::new();
            for (k, v) in [
                ("fullname", "Bob"),
                ("username", "bob"),
                ("email", "bob@example.com"),
                ("password", STRONG),
            ] {
                if k != field {
                    req = req.with(k, v);
                }
            }
            let err = d.check_signup_request(&req).unwrap_err();
            assert!(
                matches!(err, AuthError::WrongRequest(ref m) if m.contains(field)),
                "field {field}: {err}"
            );
        }
    }

    #[test]
    fn signup_rejects_bad_email_and_disallowed_domain() {
        let d = driver(&["example.com"]);
        let err = d.check_signup_request(&signup("not-an-email", STRONG)).unwrap_err();
        assert!(matches!(err, AuthError::WrongRequest(ref m) if m.contains("invalid email")));

        let err = d
            .check_signup_request(&signup("bob@other.org", STRONG))
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongRequest(ref m) if m.contains("domain")));
    }

    #[test]
    fn signup_rejects_weak_password() {
        let d = driver(&[]);
        let err = d
            .check_signup_request(&signup("bob@example.com", "password"))
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongRequest(_)));
    }

    #[test]
    fn signin_needs_username_and_password_only() {
        let d = driver(&[]);
        let req = SigninRequest::new()
            .with("username", "bob")
            .with("password", "password");
        d.check_signin_request(&req).unwrap();

        let err = d
            .check_signin_request(&SigninRequest::new().with("username", "bob"))
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongRequest(ref m) if m.contains("password")));
    }

    #[test]
    fn verify_and_reset_flows() {
        let d = driver(&[]);
        assert!(d.check_verify_request(&SigninRequest::new()).is_err());
        d.check_verify_request(&SigninRequest::new().with("token", "t0k"))
            .unwrap();

        assert!(d
            .check_ask_reset_request(&SigninRequest::new().with("email", "nope"))
            .is_err());
        d.check_ask_reset_request(&SigninRequest::new().with("email", "bob@example.com"))
            .unwrap();

        let weak = SigninRequest::new()
            .with("token", "t0k")
            .with("password", "password");
        assert!(d.check_reset_request(&weak).is_err());
        let strong = SigninRequest::new()
            .with("token", "t0k")
            .with("password", STRONG);
        d.check_reset_request(&strong).unwrap();
    }

    #[tokio::test]
    async fn user_info_is_empty() {
        let info = driver(&[])
            .user_info_from_driver(&SigninRequest::new())
            .await
            .unwrap();
        assert_eq!(info, UserInfo::default());
    }

    #[test]
    fn local_driver_has_no_redirect_capability() {
        let d = driver(&[]);
        assert!(d.as_redirectable().is_none());
        assert!(d.as_state_verifiable().is_none());
        assert!(d.as_account_flows().is_some());
    }
}
