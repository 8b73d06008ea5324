// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed session tokens.
//!
//! Tokens are HS256 JWTs. The codec embeds `iat` on every token and `exp`
//! when a time-to-live is given. Verification is stateless: a token is valid
//! when its signature matches and, if it carries `exp`, the current time is
//! strictly before it.
//!
//! The claim payload is flattened into the JWT body next to `iat`/`exp`, so
//! claim types must not use those two field names themselves.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::AuthConfig;

/// Scheme prefix of the `Authorization` header, including the separator.
pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Malformed token, undecodable payload or signature mismatch.
    #[error("token signature is invalid")]
    SignatureInvalid,
    /// Valid signature, but `exp` has passed.
    #[error("token expired at {expired_at}")]
    Expired { expired_at: i64 },
    #[error("invalid time-to-live: {0}")]
    InvalidTimeToLive(String),
    /// Key or crypto backend failure.
    #[error("token processing failed: {0}")]
    Internal(#[source] jsonwebtoken::errors::Error),
}

/// Token lifetime, either in seconds or as a human duration (`"15m"`, `"1h"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeToLive {
    Seconds(u64),
    Human(String),
}

impl TimeToLive {
    pub fn duration(&self) -> Result<Duration, TokenError> {
        match self {
            TimeToLive::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            TimeToLive::Human(text) => humantime::parse_duration(text)
                .map_err(|e| TokenError::InvalidTimeToLive(format!("'{text}': {e}"))),
        }
    }

    /// Whole seconds, as written into `exp`.
    pub fn as_secs(&self) -> Result<i64, TokenError> {
        let secs = self.duration()?.as_secs();
        i64::try_from(secs).map_err(|_| TokenError::InvalidTimeToLive(format!("{secs}s")))
    }
}

impl From<u64> for TimeToLive {
    fn from(secs: u64) -> Self {
        TimeToLive::Seconds(secs)
    }
}

/// Bare digits are seconds; anything else is parsed as a human duration.
impl From<&str> for TimeToLive {
    fn from(text: &str) -> Self {
        match text.trim().parse::<u64>() {
            Ok(secs) => TimeToLive::Seconds(secs),
            Err(_) => TimeToLive::Human(text.trim().to_string()),
        }
    }
}

/// A decoded token whose signature and expiry have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken<C> {
    pub claims: C,
    /// Unix seconds.
    pub issued_at: Option<i64>,
    /// Unix seconds, absent for tokens issued without a TTL.
    pub expires_at: Option<i64>,
}

#[derive(Serialize)]
struct OutgoingClaims<'a, C> {
    #[serde(flatten)]
    claims: &'a C,
    iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

#[derive(Clone, Deserialize)]
struct IncomingClaims<C> {
    #[serde(flatten)]
    claims: C,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Encodes and verifies session tokens with the process-wide secret.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is optional and checked by hand so the timestamp survives.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            validation,
        }
    }

    /// Sign `claims`, expiring after `ttl` when one is given.
    pub async fn encode<C: Serialize>(
        &self,
        claims: &C,
        ttl: Option<TimeToLive>,
    ) -> Result<String, TokenError> {
        self.sign_at(claims, ttl.as_ref(), Utc::now().timestamp())
    }

    pub(crate) fn sign_at<C: Serialize>(
        &self,
        claims: &C,
        ttl: Option<&TimeToLive>,
        now: i64,
    ) -> Result<String, TokenError> {
        let exp = match ttl {
            Some(ttl) => Some(now.saturating_add(ttl.as_secs()?)),
            None => None,
        };

        let body = OutgoingClaims {
            claims,
            iat: now,
            exp,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &body, &self.encoding_key)
            .map_err(TokenError::Internal)
    }

    /// Verify `token` and return its claims.
    pub async fn decode<C>(&self, token: &str) -> Result<VerifiedToken<C>, TokenError>
    where
        C: DeserializeOwned + Clone,
    {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub(crate) fn verify_at<C>(&self, token: &str, now: i64) -> Result<VerifiedToken<C>, TokenError>
    where
        C: DeserializeOwned + Clone,
    {
        let data = jsonwebtoken::decode::<IncomingClaims<C>>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => TokenError::SignatureInvalid,
            _ => TokenError::Internal(e),
        })?;

        let IncomingClaims { claims, iat, exp } = data.claims;

        if let Some(expired_at) = exp {
            if now >= expired_at {
                return Err(TokenError::Expired { expired_at });
            }
        }

        Ok(VerifiedToken {
            claims,
            issued_at: iat,
            expires_at: exp,
        })
    }

    /// Decode the bearer token carried by an `Authorization` header value.
    ///
    /// Returns `Ok(None)` when the header carries no bearer token.
    pub async fn decode_from_authorization_header<C>(
        &self,
        header: Option<&str>,
    ) -> Result<Option<VerifiedToken<C>>, TokenError>
    where
        C: DeserializeOwned + Clone,
    {
        match token_from_authorization_header(header) {
            Some(token) => self.decode(token).await.map(Some),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

/// Extract `<token>` from `"Bearer <token>"`.
///
/// Any other scheme, a missing header or an empty token yields `None`.
pub fn token_from_authorization_header(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix(BEARER_PREFIX)?.split(' ').next()?;
    (!token.is_empty()).then_some(token)
}
