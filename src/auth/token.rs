//! Signed, time-limited session tokens (HS256 JWT).
//!
//! Tokens are stateless: everything the gate needs is inside the signed
//! payload and expiry is the only invalidation mechanism. The signing secret
//! is fixed for the life of the process; rotating it invalidates every
//! outstanding token.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::authorize::Caller;
use super::role::Role;
use crate::config::AppConfig;

/// Why a presented token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

/// Failures while constructing the service or minting a token.
#[derive(Debug, Error)]
pub enum TokenIssueError {
    #[error("token signing secret is empty")]
    MissingSecret,
    #[error("token ttl must be positive")]
    InvalidTtl,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Identity facts carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: i32,
    pub role: Role,
    pub tenant_id: i32,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.user_id,
            role: self.role,
            tenant_id: self.tenant_id,
        }
    }
}

/// A freshly minted token and its absolute expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    role: Role,
    tenant_id: i32,
    iat: i64,
    exp: i64,
}

/// Issues and verifies session tokens with a process-wide symmetric secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenIssueError> {
        if secret.is_empty() {
            return Err(TokenIssueError::MissingSecret);
        }
        if ttl <= Duration::zero() {
            return Err(TokenIssueError::InvalidTtl);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, TokenIssueError> {
        let ttl_seconds =
            i64::try_from(config.token_ttl_seconds).map_err(|_| TokenIssueError::InvalidTtl)?;
        Self::new(&config.jwt_secret, Duration::seconds(ttl_seconds))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `caller` valid for the configured ttl from now.
    pub fn issue(&self, caller: &Caller) -> Result<IssuedToken, TokenIssueError> {
        self.issue_at(caller, Utc::now())
    }

    /// Issues a token as if minted at `issued_at`.
    pub fn issue_at(
        &self,
        caller: &Caller,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenIssueError> {
        let expires_at = issued_at + self.ttl;
        let claims = WireClaims {
            sub: caller.user_id.to_string(),
            role: caller.role,
            tenant_id: caller.tenant_id,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies a token against an explicit clock. A token is valid strictly
    /// before its expiry instant.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;
        let claims = data.claims;

        let user_id = claims.sub.parse::<i32>().map_err(|_| TokenError::Malformed)?;
        let issued_at = Utc
            .timestamp_opt(claims.iat, 0)
            .single()
            .ok_or(TokenError::Malformed)?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(TokenError::Malformed)?;

        if now >= expires_at {
            return Err(TokenError::Expired);
        }

        Ok(SessionClaims {
            user_id,
            role: claims.role,
            tenant_id: claims.tenant_id,
            issued_at,
            expires_at,
        })
    }
}
