use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's numeric id, as a string.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Why a presented token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    TokenExpired,
    TokenInvalid,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::TokenExpired => write!(f, "Token is expired"),
            SessionError::TokenInvalid => write!(f, "Token is invalid"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Signing parameters for session tokens, assembled once at startup.
#[derive(Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl: Duration,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>, algorithm: Algorithm, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            algorithm,
            ttl,
        }
    }
}

/// Mints and checks signed, time-bounded session tokens.
///
/// Tokens are self-contained: validity is purely signature plus expiry, there is no
/// revocation list and no refresh. Re-authenticating is the only way to get a new token.
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm: config.algorithm,
            ttl: config.ttl,
        }
    }

    /// The configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a token for `subject_id` that is valid from `now` until `now + ttl`.
    ///
    /// # Returns
    /// The compact JWT string.
    /// Returns `AppError::InternalServerError` if encoding fails.
    pub fn issue(
        &self,
        subject_id: i32,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            AppError::InternalServerError("Token lifetime overflows the clock".into())
        })?;
        let claims = Claims {
            sub: subject_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Signs a token for `subject_id` using the current time and the configured lifetime.
    pub fn issue_now(&self, subject_id: i32) -> Result<String, AppError> {
        self.issue(subject_id, Utc::now(), self.ttl)
    }

    /// Checks a token against `now` and returns its subject unchanged.
    ///
    /// Signature, algorithm and claim-shape problems (including a missing `sub` or `exp`)
    /// yield `TokenInvalid`; a well-formed token whose `exp` lies before `now` yields
    /// `TokenExpired`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<String, SessionError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked against the caller's clock below, without leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            log::debug!("Rejected session token: {}", e);
            SessionError::TokenInvalid
        })?;

        if now.timestamp() > data.claims.exp {
            return Err(SessionError::TokenExpired);
        }

        Ok(data.claims.sub)
    }
}

/// Coerces a validated subject claim into a user id.
pub fn parse_subject(subject: &str) -> Result<i32, SessionError> {
    subject.parse().map_err(|_| SessionError::TokenInvalid)
}
