//! Session lifecycle: register, login, logout, refresh
//!
//! Each login or refresh overwrites the user's stored token pair; logout
//! overwrites it with empty strings. Tokens already handed out stay
//! cryptographically valid until they expire.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::Utc;
use validator::Validate;

use crate::auth::jwt::{TokenCodec, TokenPair};
use crate::auth::models::{LoginRequest, RegisterRequest, Registered, User, UserResponse};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AuthFailure, Error, Result};
use crate::store::{bounded, UserFilter, UserPatch, UserStore};

/// Hash checked when the email is unknown, so both login failures cost one
/// bcrypt verification.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("magicstream-unknown-user").unwrap_or_default())
}

async fn hash_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| Error::Other(format!("hashing task failed: {}", e)))?
}

async fn verify_blocking(
    hash: Option<String>,
    fallback: &'static str,
    candidate: String,
) -> Result<bool> {
    tokio::task::spawn_blocking(move || match hash.as_deref() {
        Some(hash) => verify_password(hash, &candidate),
        None => verify_password(fallback, &candidate),
    })
    .await
    .map_err(|e| Error::Other(format!("verification task failed: {}", e)))
}

/// Orchestrates hashing, token issuance and token persistence
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    codec: Arc<TokenCodec>,
    timeout: Duration,
    dummy_hash: &'static str,
}

impl AuthService {
    /// Builds the service. The dummy hash is computed here, so the first
    /// unknown-email login costs the same as any other.
    pub fn new(users: Arc<dyn UserStore>, codec: Arc<TokenCodec>, timeout: Duration) -> Self {
        Self {
            users,
            codec,
            timeout,
            dummy_hash: dummy_hash(),
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Create an account. Does not log the user in.
    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<Registered> {
        req.validate()?;

        let password_hash = bounded(self.timeout, hash_blocking(req.password.clone()))
            .await
            .map_err(|e| match e {
                Error::Hash(bcrypt::BcryptError::Truncation(_)) => {
                    Error::Validation("Password is too long".to_string())
                }
                other => other,
            })?;

        let existing = bounded(
            self.timeout,
            self.users
                .count_documents(&UserFilter::Email(req.email.clone())),
        )
        .await?;
        if existing > 0 {
            return Err(Error::Conflict("User already exists".to_string()));
        }

        let mut user = User::new(
            req.first_name,
            req.last_name,
            req.email,
            password_hash,
            req.role,
        );
        user.favourite_genres = req.favourite_genres;

        let user_id = bounded(self.timeout, self.users.insert_one(user)).await?;
        tracing::info!(%user_id, "Registered user");

        Ok(Registered { user_id })
    }

    /// Check credentials and issue a new token pair.
    ///
    /// Unknown email and wrong password fail identically.
    #[tracing::instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<(UserResponse, TokenPair)> {
        let user = bounded(
            self.timeout,
            self.users.find_one(&UserFilter::Email(req.email.clone())),
        )
        .await?;

        let stored_hash = user.as_ref().map(|u| u.password.clone());
        let matches = bounded(
            self.timeout,
            verify_blocking(stored_hash, self.dummy_hash, req.password),
        )
        .await?;

        let user = match user {
            Some(user) if matches => user,
            Some(_) => {
                tracing::debug!("Password mismatch");
                return Err(Error::Unauthenticated(AuthFailure::InvalidCredentials));
            }
            None => {
                tracing::debug!("No account for email");
                return Err(Error::Unauthenticated(AuthFailure::InvalidCredentials));
            }
        };

        let tokens = self.codec.issue_pair(&user)?;
        self.persist_tokens(&user.user_id, &tokens.access_token, &tokens.refresh_token)
            .await?;

        tracing::info!(user_id = %user.user_id, "User logged in");
        Ok((UserResponse::from(user), tokens))
    }

    /// Clear the stored token pair for `user_id`
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self, user_id: &str) -> Result<()> {
        self.persist_tokens(user_id, "", "").await?;
        tracing::info!("User logged out");
        Ok(())
    }

    /// Exchange a refresh token for a brand new pair
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenPair> {
        let token = refresh_token.ok_or(Error::Unauthenticated(AuthFailure::MissingToken))?;
        if token.is_empty() {
            return Err(Error::Unauthenticated(AuthFailure::EmptyToken));
        }

        let claims = self.codec.parse_refresh(token)?;

        let user = bounded(
            self.timeout,
            self.users
                .find_one(&UserFilter::UserId(claims.user_id.clone())),
        )
        .await?
        .ok_or(Error::Unauthenticated(AuthFailure::UnknownUser))?;

        let tokens = self.codec.issue_pair(&user)?;
        self.persist_tokens(&user.user_id, &tokens.access_token, &tokens.refresh_token)
            .await?;

        tracing::info!(user_id = %user.user_id, "Tokens refreshed");
        Ok(tokens)
    }

    /// Overwrite the stored token pair and bump `updated_at`
    pub async fn persist_tokens(
        &self,
        user_id: &str,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<()> {
        let patch = UserPatch {
            token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            updated_at: Utc::now(),
        };

        let matched = bounded(
            self.timeout,
            self.users
                .update_one(&UserFilter::UserId(user_id.to_string()), &patch),
        )
        .await?;

        if matched == 0 {
            tracing::warn!(%user_id, "No user to store tokens for");
            return Err(Error::NotFound("User not found".to_string()));
        }

        Ok(())
    }
}
