//! Movie catalog: listing, lookup, recommendations and admin reviews

pub mod models;

use std::sync::Arc;
use std::time::Duration;

use validator::Validate;

use crate::auth::middleware::require_role;
use crate::auth::models::{Identity, Role};
use crate::error::{Error, Result};
use crate::sentiment::{review_ranking, SentimentClassifier};
use crate::store::{bounded, MovieStore, UserFilter, UserStore};
use models::{Genre, Movie, ReviewResponse};

/// Catalog operations over the movie and user stores
#[derive(Clone)]
pub struct Catalog {
    movies: Arc<dyn MovieStore>,
    users: Arc<dyn UserStore>,
    classifier: Option<Arc<dyn SentimentClassifier>>,
    prompt_template: String,
    recommended_limit: usize,
    timeout: Duration,
}

impl Catalog {
    pub fn new(
        movies: Arc<dyn MovieStore>,
        users: Arc<dyn UserStore>,
        prompt_template: impl Into<String>,
        recommended_limit: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            movies,
            users,
            classifier: None,
            prompt_template: prompt_template.into(),
            recommended_limit,
            timeout,
        }
    }

    /// Enable admin review ranking
    pub fn with_classifier(mut self, classifier: Arc<dyn SentimentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub async fn get_movies(&self) -> Result<Vec<Movie>> {
        bounded(self.timeout, self.movies.find_all()).await
    }

    pub async fn get_movie(&self, imdb_id: &str) -> Result<Movie> {
        if imdb_id.is_empty() {
            return Err(Error::Validation("Movie ID is required".to_string()));
        }

        bounded(self.timeout, self.movies.find_one(imdb_id))
            .await?
            .ok_or_else(|| Error::NotFound("Movie not found".to_string()))
    }

    #[tracing::instrument(skip(self, movie), fields(imdb_id = %movie.imdb_id))]
    pub async fn add_movie(&self, movie: Movie) -> Result<String> {
        movie.validate()?;
        let imdb_id = bounded(self.timeout, self.movies.insert_one(movie)).await?;
        tracing::info!("Movie added");
        Ok(imdb_id)
    }

    pub async fn genres(&self) -> Result<Vec<Genre>> {
        bounded(self.timeout, self.movies.genres()).await
    }

    /// Movies in the user's favourite genres, best ranked first.
    ///
    /// An unknown user, or one without favourites, gets an empty list.
    pub async fn recommended_movies(&self, user_id: &str) -> Result<Vec<Movie>> {
        let user = bounded(
            self.timeout,
            self.users.find_one(&UserFilter::UserId(user_id.to_string())),
        )
        .await?;

        let genre_names = match user {
            Some(user) => user.favourite_genre_names(),
            None => {
                tracing::debug!(%user_id, "No user for recommendations");
                return Ok(Vec::new());
            }
        };
        if genre_names.is_empty() {
            return Ok(Vec::new());
        }

        bounded(
            self.timeout,
            self.movies
                .find_by_genres(&genre_names, self.recommended_limit),
        )
        .await
    }

    /// Store an admin review together with the ranking the classifier picks
    #[tracing::instrument(skip(self, identity, admin_review))]
    pub async fn admin_review_update(
        &self,
        identity: Option<&Identity>,
        imdb_id: &str,
        admin_review: &str,
    ) -> Result<ReviewResponse> {
        require_role(identity, Role::Admin)?;

        if imdb_id.is_empty() {
            return Err(Error::Validation("Movie ID is required".to_string()));
        }

        let classifier = self
            .classifier
            .as_ref()
            .ok_or_else(|| Error::Config("no sentiment classifier configured".to_string()))?;

        let rankings = bounded(self.timeout, self.movies.rankings()).await?;
        let ranking = bounded(
            self.timeout,
            review_ranking(
                classifier.as_ref(),
                &rankings,
                &self.prompt_template,
                admin_review,
            ),
        )
        .await?;

        let matched = bounded(
            self.timeout,
            self.movies.update_review(imdb_id, admin_review, &ranking),
        )
        .await?;
        if matched == 0 {
            return Err(Error::NotFound("Movie not found".to_string()));
        }

        tracing::info!(ranking = %ranking.ranking_name, "Admin review updated");
        Ok(ReviewResponse {
            ranking_name: ranking.ranking_name,
            admin_review: admin_review.to_string(),
        })
    }
}
