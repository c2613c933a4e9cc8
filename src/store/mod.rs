//! Document store contract and backends
//!
//! The rest of the crate only sees [`UserStore`] and [`MovieStore`]. Writes
//! are last-write-wins: two concurrent logins for the same user both
//! succeed and whichever update lands second is the current token pair.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::auth::models::User;
use crate::catalog::models::{Genre, Movie, Ranking, SeedData};
use crate::config::{DatabaseConfig, StoreBackend};
use crate::error::{Error, Result};

/// Selects user records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    UserId(String),
    Email(String),
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            UserFilter::UserId(id) => &user.user_id == id,
            UserFilter::Email(email) => &user.email == email,
        }
    }
}

/// Token fields overwritten on login, refresh and logout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPatch {
    pub token: String,
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        user.token = self.token.clone();
        user.refresh_token = self.refresh_token.clone();
        user.updated_at = self.updated_at;
    }
}

/// The "users" collection
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>>;

    /// Returns the number of matched records
    async fn update_one(&self, filter: &UserFilter, patch: &UserPatch) -> Result<u64>;

    /// Returns the new record's user id. Fails with `Conflict` on a taken email.
    async fn insert_one(&self, user: User) -> Result<String>;

    async fn count_documents(&self, filter: &UserFilter) -> Result<u64>;
}

/// The "movies", "genres" and "rankings" collections
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Movie>>;

    async fn find_one(&self, imdb_id: &str) -> Result<Option<Movie>>;

    /// Fails with `Conflict` when the imdb id is already catalogued
    async fn insert_one(&self, movie: Movie) -> Result<String>;

    /// Returns the number of matched movies
    async fn update_review(&self, imdb_id: &str, admin_review: &str, ranking: &Ranking)
        -> Result<u64>;

    /// Movies sharing a genre with `genre_names`, best ranking value first
    async fn find_by_genres(&self, genre_names: &[String], limit: usize) -> Result<Vec<Movie>>;

    async fn rankings(&self) -> Result<Vec<Ranking>>;

    async fn genres(&self) -> Result<Vec<Genre>>;

    /// Load reference data, skipping entries that already exist
    async fn seed(&self, data: &SeedData) -> Result<()>;
}

/// Handles to the two halves of one backend
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub movies: Arc<dyn MovieStore>,
}

impl Stores {
    pub fn from_backend<T>(backend: T) -> Self
    where
        T: UserStore + MovieStore + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            users: backend.clone(),
            movies: backend,
        }
    }
}

/// Run a store or hashing call, giving up after `limit`
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Error::Timeout(limit))?
}

/// Open the configured backend and apply the seed file, if any
pub async fn connect(config: &DatabaseConfig) -> Result<Stores> {
    let stores = match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Stores::from_backend(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            let url = config.url.as_deref().ok_or_else(|| {
                Error::Config("database.url is required for the postgres backend".to_string())
            })?;
            Stores::from_backend(bounded(config.timeout(), PostgresStore::connect(url)).await?)
        }
    };

    if let Some(path) = &config.seed_file {
        let content = tokio::fs::read_to_string(path).await?;
        let seed = SeedData::from_yaml(&content)?;
        bounded(config.timeout(), stores.movies.seed(&seed)).await?;
        tracing::info!(
            "Seeded {} genres, {} rankings and {} movies from {}",
            seed.genres.len(),
            seed.rankings.len(),
            seed.movies.len(),
            path.display()
        );
    }

    Ok(stores)
}
