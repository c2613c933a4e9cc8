//! In-memory store

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{MovieStore, UserFilter, UserPatch, UserStore};
use crate::auth::models::User;
use crate::catalog::models::{Genre, Movie, Ranking, SeedData};
use crate::error::{Error, Result};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    movies: Vec<Movie>,
    genres: Vec<Genre>,
    rankings: Vec<Ranking>,
}

/// Store kept entirely in process memory. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| filter.matches(u)).cloned())
    }

    async fn update_one(&self, filter: &UserFilter, patch: &UserPatch) -> Result<u64> {
        let mut data = self.inner.write().await;
        match data.users.iter_mut().find(|u| filter.matches(u)) {
            Some(user) => {
                patch.apply(user);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert_one(&self, user: User) -> Result<String> {
        let mut data = self.inner.write().await;
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(Error::Conflict("User already exists".to_string()));
        }
        let user_id = user.user_id.clone();
        data.users.push(user);
        Ok(user_id)
    }

    async fn count_documents(&self, filter: &UserFilter) -> Result<u64> {
        let data = self.inner.read().await;
        Ok(data.users.iter().filter(|u| filter.matches(u)).count() as u64)
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Movie>> {
        Ok(self.inner.read().await.movies.clone())
    }

    async fn find_one(&self, imdb_id: &str) -> Result<Option<Movie>> {
        let data = self.inner.read().await;
        Ok(data.movies.iter().find(|m| m.imdb_id == imdb_id).cloned())
    }

    async fn insert_one(&self, movie: Movie) -> Result<String> {
        let mut data = self.inner.write().await;
        if data.movies.iter().any(|m| m.imdb_id == movie.imdb_id) {
            return Err(Error::Conflict(format!(
                "Movie {} already exists",
                movie.imdb_id
            )));
        }
        let imdb_id = movie.imdb_id.clone();
        data.movies.push(movie);
        Ok(imdb_id)
    }

    async fn update_review(
        &self,
        imdb_id: &str,
        admin_review: &str,
        ranking: &Ranking,
    ) -> Result<u64> {
        let mut data = self.inner.write().await;
        match data.movies.iter_mut().find(|m| m.imdb_id == imdb_id) {
            Some(movie) => {
                movie.admin_review = admin_review.to_string();
                movie.ranking = ranking.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find_by_genres(&self, genre_names: &[String], limit: usize) -> Result<Vec<Movie>> {
        let data = self.inner.read().await;
        let mut matches: Vec<Movie> = data
            .movies
            .iter()
            .filter(|m| m.has_any_genre(genre_names))
            .cloned()
            .collect();
        matches.sort_by_key(|m| m.ranking.ranking_value);
        matches.truncate(limit);
        Ok(matches)
    }

    async fn rankings(&self) -> Result<Vec<Ranking>> {
        Ok(self.inner.read().await.rankings.clone())
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        Ok(self.inner.read().await.genres.clone())
    }

    async fn seed(&self, seed: &SeedData) -> Result<()> {
        let mut data = self.inner.write().await;

        for genre in &seed.genres {
            if !data.genres.iter().any(|g| g.genre_id == genre.genre_id) {
                data.genres.push(genre.clone());
            }
        }
        for ranking in &seed.rankings {
            if !data
                .rankings
                .iter()
                .any(|r| r.ranking_value == ranking.ranking_value)
            {
                data.rankings.push(ranking.clone());
            }
        }
        for movie in &seed.movies {
            if !data.movies.iter().any(|m| m.imdb_id == movie.imdb_id) {
                data.movies.push(movie.clone());
            }
        }

        Ok(())
    }
}
