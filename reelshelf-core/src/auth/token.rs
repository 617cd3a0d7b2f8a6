//! Signed, expiring tokens for account actions and API authentication.
//!
//! A token is `base64url(envelope) "." base64url(hmac_sha256(envelope))`,
//! where the envelope is the JSON object `{"iat", "exp", "data"}`. The
//! signature is checked before anything inside the token is decoded.
//!
//! Verification proves only that the token was minted with our key and is
//! still fresh. Callers must still compare the embedded account id with the
//! account the token is being applied to.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signing key must not be empty")]
    EmptyKey,
    #[error("token has expired")]
    Expired,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token payload has an unexpected shape: {0}")]
    Payload(String),
    #[error("failed to encode token: {0}")]
    Encode(String),
}

#[derive(Serialize)]
struct OutgoingEnvelope<'a, T> {
    iat: i64,
    exp: i64,
    data: &'a T,
}

#[derive(Deserialize)]
struct IncomingEnvelope {
    iat: i64,
    exp: i64,
    data: serde_json::Value,
}

/// A verified token payload together with its validity window.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken<T> {
    pub payload: T,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies HMAC-SHA-256 signed tokens with a process secret.
pub struct TokenCodec {
    key: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::EmptyKey);
        }
        Ok(Self {
            key: Zeroizing::new(secret.to_vec()),
        })
    }

    pub fn issue<T: Serialize>(
        &self,
        payload: &T,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(payload, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at<T: Serialize>(
        &self,
        payload: &T,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let envelope = OutgoingEnvelope {
            iat,
            exp: iat.saturating_add(ttl),
            data: payload,
        };
        let json = serde_json::to_vec(&envelope)
            .map_err(|err| TokenError::Encode(err.to_string()))?;
        let body = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{body}.{signature}"))
    }

    pub fn verify<T: DeserializeOwned>(
        &self,
        token: &str,
    ) -> Result<T, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    pub fn verify_at<T: DeserializeOwned>(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<T, TokenError> {
        self.decode_at(token, now).map(|verified| verified.payload)
    }

    pub fn decode_at<T: DeserializeOwned>(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedToken<T>, TokenError> {
        let (body, signature) = token
            .trim()
            .rsplit_once('.')
            .ok_or(TokenError::BadSignature)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::BadSignature)?;

        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| TokenError::BadSignature)?;
        let envelope: IncomingEnvelope = serde_json::from_slice(&json)
            .map_err(|err| TokenError::Payload(err.to_string()))?;

        if now.timestamp() > envelope.exp {
            return Err(TokenError::Expired);
        }

        let payload = serde_json::from_value(envelope.data)
            .map_err(|err| TokenError::Payload(err.to_string()))?;

        Ok(VerifiedToken {
            payload,
            issued_at: timestamp(envelope.iat)?,
            expires_at: timestamp(envelope.exp)?,
        })
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|err| TokenError::Encode(err.to_string()))
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| TokenError::Payload(format!("invalid timestamp {secs}")))
}
