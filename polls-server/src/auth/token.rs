//! Signed access tokens (HS256 JWT)
//!
//! The subject claim carries the user id. Verification fails closed: any
//! problem with the token becomes a [`TokenRejection`] and the caller is
//! treated as unauthenticated.

use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use sha2::Sha256;
use uuid::Uuid;

use crate::store::UserId;

/// Why a presented token was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token was issued by someone else")]
    WrongIssuer,
    #[error("token is not valid yet")]
    NotYetValid,
    #[error("token has expired")]
    Expired,
    #[error("token has no valid subject")]
    BadSubject,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signing key: {0}")]
    Key(String),
    #[error("failed to sign token: {0}")]
    Sign(#[from] jwt::Error),
}

/// Issues and verifies access tokens with one shared secret.
#[derive(Clone)]
pub struct TokenService {
    key: Hmac<Sha256>,
    issuer: String,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, issuer: impl Into<String>, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::Key("secret must not be empty".into()));
        }

        let key = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|e| TokenError::Key(e.to_string()))?;

        Ok(Self {
            key,
            issuer: issuer.into(),
            ttl,
        })
    }

    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = now + self.ttl;
        let claims = Claims::new(RegisteredClaims {
            issuer: Some(self.issuer.clone()),
            subject: Some(user_id.to_string()),
            issued_at: Some(now.timestamp().max(0) as u64),
            expiration: Some(expires_at.timestamp().max(0) as u64),
            json_web_token_id: Some(Uuid::new_v4().to_string()),
            ..Default::default()
        });

        Ok(claims.sign_with_key(&self.key)?)
    }

    pub fn verify(&self, token: &str) -> Result<UserId, TokenRejection> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature, issuer, issued-at and expiry relative to `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenRejection> {
        let token: Token<Header, Claims, _> =
            token.verify_with_key(&self.key).map_err(|e| match e {
                jwt::Error::InvalidSignature | jwt::Error::RustCryptoMac(_) => {
                    TokenRejection::BadSignature
                }
                _ => TokenRejection::Malformed,
            })?;

        let claims = &token.claims().registered;

        if claims.issuer.as_deref() != Some(self.issuer.as_str()) {
            return Err(TokenRejection::WrongIssuer);
        }

        let issued_at = claims
            .issued_at
            .and_then(timestamp)
            .ok_or(TokenRejection::Malformed)?;
        if issued_at > now {
            return Err(TokenRejection::NotYetValid);
        }

        let expires_at = claims
            .expiration
            .and_then(timestamp)
            .ok_or(TokenRejection::Malformed)?;
        if expires_at <= now {
            return Err(TokenRejection::Expired);
        }

        claims
            .subject
            .as_deref()
            .and_then(|s| s.parse::<UserId>().ok())
            .ok_or(TokenRejection::BadSubject)
    }
}

fn timestamp(secs: u64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(i64::try_from(secs).ok()?, 0).single()
}
