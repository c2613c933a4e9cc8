//! Authentication models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::{Error, Result};

/// User roles for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Administrator - may edit reviews
    Admin,
    /// Regular member
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(Error::Validation(format!("unknown role: {}", other))),
        }
    }
}

/// Movie genre, shared by user preferences and the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub genre_id: i32,
    pub genre_name: String,
}

/// Stored user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Public user identifier
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// bcrypt hash, never the plaintext
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Current access token, empty when logged out
    #[serde(default)]
    pub token: String,
    /// Current refresh token, empty when logged out
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub favourite_genres: Vec<Genre>,
}

impl User {
    /// Create a new user record around an already hashed password
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: uuid::Uuid::new_v4().simple().to_string(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password_hash.into(),
            role,
            created_at: now,
            updated_at: now,
            token: String::new(),
            refresh_token: String::new(),
            favourite_genres: Vec::new(),
        }
    }

    pub fn favourite_genre_names(&self) -> Vec<String> {
        self.favourite_genres
            .iter()
            .map(|g| g.genre_name.clone())
            .collect()
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100))]
    pub first_name: String,
    #[validate(length(min = 2, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub role: Role,
    #[validate(length(min = 1))]
    pub favourite_genres: Vec<Genre>,
}

/// Login credentials. Not shape-checked, so every failure stays generic.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Optional body of a logout request
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Returned after registration
#[derive(Debug, Serialize, Deserialize)]
pub struct Registered {
    pub user_id: String,
}

/// User information in responses. Tokens travel only in cookies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub favourite_genres: Vec<Genre>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            favourite_genres: user.favourite_genres,
        }
    }
}

/// Request-scoped identity attached by the auth gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: String,
}
