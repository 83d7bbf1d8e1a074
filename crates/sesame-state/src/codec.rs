// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HS256 issuance and verification of signin state tokens.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use sesame_core::{AuthError, SigninConsumerToken, SigninRequest};

/// How long a state token stays valid after issuance.
pub const DEFAULT_STATE_VALIDITY: Duration = Duration::from_secs(5 * 60);

/// The only message a failed verification ever reports.
pub const INVALID_STATE_MESSAGE: &str = "invalid or expired signin state";

/// Claims carried by a state token.
#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    iat: i64,
    exp: i64,
    jti: String,
    signin: SigninConsumerToken,
}

/// Issues and verifies signed, time-bound signin state tokens.
///
/// Cheap to clone; shared by every redirect driver of a process.
#[derive(Clone)]
pub struct SigninStateCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl std::fmt::Debug for SigninStateCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigninStateCodec")
            .field("key", &"[redacted]")
            .field("validity", &self.validity)
            .finish()
    }
}

impl SigninStateCodec {
    /// Create a codec from the configured signing key.
    pub fn new(signing_key: &SecretString, validity: Duration) -> Result<Self, AuthError> {
        Self::from_bytes(signing_key.expose_secret().as_bytes(), validity)
    }

    /// Create a codec from raw key bytes.
    pub fn from_bytes(key: &[u8], validity: Duration) -> Result<Self, AuthError> {
        if key.is_empty() {
            return Err(AuthError::Config(
                "state signing key must not be empty".to_string(),
            ));
        }
        if validity.is_zero() {
            return Err(AuthError::Config(
                "state token validity must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            validity,
        })
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Sign the given intent, valid from now.
    pub fn issue(&self, token: &SigninConsumerToken) -> Result<String, AuthError> {
        self.issue_at(token, Utc::now())
    }

    /// Sign the given intent as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        token: &SigninConsumerToken,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let iat = issued_at.timestamp();
        let validity = i64::try_from(self.validity.as_secs()).unwrap_or(i64::MAX);
        let mut signin = token.clone();
        signin.issued_at = iat;

        let claims = StateClaims {
            iat,
            exp: iat.saturating_add(validity),
            jti: Uuid::new_v4().to_string(),
            signin,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::unknown("failed to sign state token", e))
    }

    /// Verify a state token and return the embedded intent.
    ///
    /// Bad signature, malformed encoding, and expiry all yield the same
    /// [`AuthError::WrongRequest`] carrying [`INVALID_STATE_MESSAGE`].
    pub fn verify(&self, state: &str) -> Result<SigninConsumerToken, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iat"]);

        let data = decode::<StateClaims>(state, &self.decoding_key, &validation).map_err(|e| {
            debug!(reason = %e, "state token verification failed");
            AuthError::WrongRequest(INVALID_STATE_MESSAGE.to_string())
        })?;

        let mut signin = data.claims.signin;
        signin.issued_at = data.claims.iat;
        Ok(signin)
    }

    /// Verify the `state` field of a provider callback.
    ///
    /// A missing or empty field fails with the usual missing-field error before
    /// any verification happens.
    pub fn check_request(&self, req: &SigninRequest) -> Result<SigninConsumerToken, AuthError> {
        let state = req.string("state")?;
        self.verify(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn codec() -> SigninStateCodec {
        SigninStateCodec::from_bytes(b"0123456789abcdef0123456789abcdef", DEFAULT_STATE_VALIDITY)
            .unwrap()
    }

    fn intent() -> SigninConsumerToken {
        SigninConsumerToken {
            origin: "ui".into(),
            redirect_uri: "https://app.example.com/home".into(),
            require_mfa: true,
            ..Default::default()
        }
    }

    /// Flip the first character of the signature segment.
    fn tamper_signature(token: &str) -> String {
        let (head, sig) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = sig.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        format!("{head}.{}", chars.into_iter().collect::<String>())
    }

    #[test]
    fn issue_then_verify_returns_intent() {
        let codec = codec();
        let now = Utc::now();
        let state = codec.issue_at(&intent(), now).unwrap();
        let back = codec.verify(&state).unwrap();

        assert_eq!(back.origin, "ui");
        assert_eq!(back.redirect_uri, "https://app.example.com/home");
        assert!(back.require_mfa);
        assert_eq!(back.issued_at, now.timestamp());
    }

    #[test]
    fn each_issue_is_unique() {
        let codec = codec();
        let a = codec.issue(&intent()).unwrap();
        let b = codec.issue(&intent()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn flipped_signature_is_rejected() {
        let codec = codec();
        let state = tamper_signature(&codec.issue(&intent()).unwrap());
        let err = codec.verify(&state).unwrap_err();
        assert!(matches!(err, AuthError::WrongRequest(ref m) if m == INVALID_STATE_MESSAGE));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let issued = Utc::now() - ChronoDuration::minutes(10);
        let state = codec.issue_at(&intent(), issued).unwrap();
        let err = codec.verify(&state).unwrap_err();
        assert!(matches!(err, AuthError::WrongRequest(ref m) if m == INVALID_STATE_MESSAGE));
    }

    #[test]
    fn tampered_and_expired_errors_look_identical() {
        let codec = codec();
        let tampered = tamper_signature(&codec.issue(&intent()).unwrap());
        let expired = codec
            .issue_at(&intent(), Utc::now() - ChronoDuration::hours(1))
            .unwrap();

        let a = codec.verify(&tampered).unwrap_err().to_string();
        let b = codec.verify(&expired).unwrap_err().to_string();
        let c = codec.verify("not-a-jws").unwrap_err().to_string();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn token_from_other_key_is_rejected() {
        let other =
            SigninStateCodec::from_bytes(b"another-secret-key-another-secret", DEFAULT_STATE_VALIDITY)
                .unwrap();
        let state = other.issue(&intent()).unwrap();
        assert!(codec().verify(&state).is_err());
    }

    #[test]
    fn check_request_requires_state_field() {
        let codec = codec();
        let err = codec.check_request(&SigninRequest::new()).unwrap_err();
        assert!(matches!(err, AuthError::WrongRequest(ref m) if m.contains("state")));

        let state = codec.issue(&intent()).unwrap();
        let req = SigninRequest::new().with("state", state);
        assert_eq!(codec.check_request(&req).unwrap().origin, "ui");
    }

    #[test]
    fn empty_key_is_a_config_error() {
        let err = SigninStateCodec::from_bytes(b"", DEFAULT_STATE_VALIDITY).unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));
        let err = SigninStateCodec::from_bytes(b"k", Duration::ZERO).unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));
    }

    #[test]
    fn secret_string_constructor_and_debug_redaction() {
        let key = SecretString::from("super-secret-signing-key".to_string());
        let codec = SigninStateCodec::new(&key, Duration::from_secs(60)).unwrap();
        assert_eq!(codec.validity(), Duration::from_secs(60));
        let out = format!("{codec:?}");
        assert!(!out.contains("super-secret"));
        assert!(out.contains("[redacted]"));
    }
}
