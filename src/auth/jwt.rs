//! JWT token handling
//!
//! Every session holds two HS256 tokens: a short-lived access token and a
//! long-lived refresh token, each signed with its own secret. Parsing is the
//! same for both and only differs in which secret is supplied.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::auth::models::{Identity, User};
use crate::config::AuthConfig;
use crate::error::{Error, Result, TokenError};

pub const ISSUER: &str = "MagicStream";

/// Access token lifetime (24 hours)
pub const ACCESS_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Refresh token lifetime (7 days)
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// JWT claims, shared by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "UserId")]
    pub user_id: String,
    /// Issuer
    pub iss: String,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

impl Claims {
    /// Build claims for a user, valid for `ttl_secs` from `issued_at`
    pub fn for_user(user: &User, issued_at: i64, ttl_secs: i64) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role.to_string(),
            user_id: user.user_id.clone(),
            iss: ISSUER.to_string(),
            iat: issued_at,
            exp: issued_at + ttl_secs,
        }
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            role: self.role.clone(),
        }
    }
}

/// A freshly issued access + refresh token pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies tokens with the two process-wide secrets
#[derive(Clone)]
pub struct TokenCodec {
    access_secret: String,
    refresh_secret: String,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .finish()
    }
}

impl TokenCodec {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
        }
    }

    /// Build from configuration, refusing to start without both secrets
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(&config.access_secret, &config.refresh_secret))
    }

    /// Issue a new access + refresh pair for `user`
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        let now = Utc::now().timestamp();

        let access_token = sign(
            &Claims::for_user(user, now, ACCESS_TOKEN_TTL_SECS),
            &self.access_secret,
        )?;
        let refresh_token = sign(
            &Claims::for_user(user, now, REFRESH_TOKEN_TTL_SECS),
            &self.refresh_secret,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub fn parse_access(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        parse(token, &self.access_secret)
    }

    pub fn parse_refresh(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        parse(token, &self.refresh_secret)
    }
}

/// Sign claims with HS256
pub fn sign(claims: &Claims, secret: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(Error::Signing("signing secret is not configured".to_string()));
    }

    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Signing(format!("Failed to create token: {}", e)))
}

/// Verify and decode a token signed with `secret`.
///
/// Only the HMAC family is accepted, so a token announcing another
/// algorithm (or none) is refused before its signature is looked at.
/// Expiry is checked after verification with no leeway.
pub fn parse(token: &str, secret: &str) -> std::result::Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::Base64(_) if readable_without_signature(token) => TokenError::InvalidSignature,
        kind => classify(kind),
    })?;

    if claims.is_expired() {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

/// Header and payload decode cleanly, so a base64 failure came from the
/// signature segment.
fn readable_without_signature(token: &str) -> bool {
    jsonwebtoken::dangerous::insecure_decode::<Claims>(token).is_ok()
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::UnexpectedAlgorithm
        }
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
