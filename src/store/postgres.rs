//! PostgreSQL store

use async_trait::async_trait;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::Json;
use tokio_postgres::{Client, NoTls, Row};

use super::{MovieStore, UserFilter, UserPatch, UserStore};
use crate::auth::models::User;
use crate::catalog::models::{Genre, Movie, Ranking, SeedData};
use crate::error::{Error, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id          TEXT PRIMARY KEY,
    first_name       TEXT NOT NULL,
    last_name        TEXT NOT NULL,
    email            TEXT NOT NULL UNIQUE,
    password         TEXT NOT NULL,
    role             TEXT NOT NULL,
    created_at       TIMESTAMPTZ NOT NULL,
    updated_at       TIMESTAMPTZ NOT NULL,
    token            TEXT NOT NULL DEFAULT '',
    refresh_token    TEXT NOT NULL DEFAULT '',
    favourite_genres JSONB NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS movies (
    seq           BIGSERIAL,
    imdb_id       TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    poster_path   TEXT NOT NULL,
    youtube_id    TEXT NOT NULL,
    genre         JSONB NOT NULL,
    admin_review  TEXT NOT NULL DEFAULT '',
    ranking_value INTEGER NOT NULL,
    ranking_name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS genres (
    genre_id   INTEGER PRIMARY KEY,
    genre_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rankings (
    ranking_value INTEGER PRIMARY KEY,
    ranking_name  TEXT NOT NULL
);
"#;

const MOVIE_COLUMNS: &str =
    "imdb_id, title, poster_path, youtube_id, genre, admin_review, ranking_value, ranking_name";

/// Store backed by a single PostgreSQL connection
pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    /// Connect and create the tables if they are missing
    pub async fn connect(url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        client.batch_execute(SCHEMA).await?;
        tracing::info!("Connected to PostgreSQL store");

        Ok(Self { client })
    }
}

fn filter_clause(filter: &UserFilter) -> (&'static str, &str) {
    match filter {
        UserFilter::UserId(id) => ("user_id", id.as_str()),
        UserFilter::Email(email) => ("email", email.as_str()),
    }
}

fn conflict_or(err: tokio_postgres::Error, message: String) -> Error {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        Error::Conflict(message)
    } else {
        Error::Database(err)
    }
}

fn row_to_user(row: &Row) -> Result<User> {
    let role: String = row.try_get("role")?;
    let Json(favourite_genres) = row.try_get::<_, Json<Vec<Genre>>>("favourite_genres")?;

    Ok(User {
        user_id: row.try_get("user_id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        role: role.parse()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        token: row.try_get("token")?,
        refresh_token: row.try_get("refresh_token")?,
        favourite_genres,
    })
}

fn row_to_movie(row: &Row) -> Result<Movie> {
    let Json(genre) = row.try_get::<_, Json<Vec<Genre>>>("genre")?;

    Ok(Movie {
        imdb_id: row.try_get("imdb_id")?,
        title: row.try_get("title")?,
        poster_path: row.try_get("poster_path")?,
        youtube_id: row.try_get("youtube_id")?,
        genre,
        admin_review: row.try_get("admin_review")?,
        ranking: Ranking {
            ranking_value: row.try_get("ranking_value")?,
            ranking_name: row.try_get("ranking_name")?,
        },
    })
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>> {
        let (column, value) = filter_clause(filter);
        let query = format!("SELECT * FROM users WHERE {} = $1 LIMIT 1", column);
        let row = self.client.query_opt(&query, &[&value]).await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn update_one(&self, filter: &UserFilter, patch: &UserPatch) -> Result<u64> {
        let (column, value) = filter_clause(filter);
        let query = format!(
            "UPDATE users SET token = $1, refresh_token = $2, updated_at = $3 WHERE {} = $4",
            column
        );
        let matched = self
            .client
            .execute(
                &query,
                &[&patch.token, &patch.refresh_token, &patch.updated_at, &value],
            )
            .await?;
        Ok(matched)
    }

    async fn insert_one(&self, user: User) -> Result<String> {
        self.client
            .execute(
                "INSERT INTO users (user_id, first_name, last_name, email, password, role, \
                 created_at, updated_at, token, refresh_token, favourite_genres) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
                &[
                    &user.user_id,
                    &user.first_name,
                    &user.last_name,
                    &user.email,
                    &user.password,
                    &user.role.as_str(),
                    &user.created_at,
                    &user.updated_at,
                    &user.token,
                    &user.refresh_token,
                    &Json(&user.favourite_genres),
                ],
            )
            .await
            .map_err(|e| conflict_or(e, "User already exists".to_string()))?;
        Ok(user.user_id)
    }

    async fn count_documents(&self, filter: &UserFilter) -> Result<u64> {
        let (column, value) = filter_clause(filter);
        let query = format!("SELECT COUNT(*) FROM users WHERE {} = $1", column);
        let row = self.client.query_one(&query, &[&value]).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count as u64)
    }
}

#[async_trait]
impl MovieStore for PostgresStore {
    async fn find_all(&self) -> Result<Vec<Movie>> {
        let query = format!("SELECT {} FROM movies ORDER BY seq", MOVIE_COLUMNS);
        let rows = self.client.query(&query, &[]).await?;
        rows.iter().map(row_to_movie).collect()
    }

    async fn find_one(&self, imdb_id: &str) -> Result<Option<Movie>> {
        let query = format!("SELECT {} FROM movies WHERE imdb_id = $1", MOVIE_COLUMNS);
        let row = self.client.query_opt(&query, &[&imdb_id]).await?;
        row.as_ref().map(row_to_movie).transpose()
    }

    async fn insert_one(&self, movie: Movie) -> Result<String> {
        self.client
            .execute(
                "INSERT INTO movies (imdb_id, title, poster_path, youtube_id, genre, \
                 admin_review, ranking_value, ranking_name) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &movie.imdb_id,
                    &movie.title,
                    &movie.poster_path,
                    &movie.youtube_id,
                    &Json(&movie.genre),
                    &movie.admin_review,
                    &movie.ranking.ranking_value,
                    &movie.ranking.ranking_name,
                ],
            )
            .await
            .map_err(|e| conflict_or(e, format!("Movie {} already exists", movie.imdb_id)))?;
        Ok(movie.imdb_id)
    }

    async fn update_review(
        &self,
        imdb_id: &str,
        admin_review: &str,
        ranking: &Ranking,
    ) -> Result<u64> {
        let matched = self
            .client
            .execute(
                "UPDATE movies SET admin_review = $1, ranking_value = $2, ranking_name = $3 \
                 WHERE imdb_id = $4",
                &[
                    &admin_review,
                    &ranking.ranking_value,
                    &ranking.ranking_name,
                    &imdb_id,
                ],
            )
            .await?;
        Ok(matched)
    }

    async fn find_by_genres(&self, genre_names: &[String], limit: usize) -> Result<Vec<Movie>> {
        let query = format!(
            "SELECT {} FROM movies m \
             WHERE EXISTS (SELECT 1 FROM jsonb_array_elements(m.genre) g \
                           WHERE g->>'genre_name' = ANY($1)) \
             ORDER BY ranking_value ASC, seq ASC LIMIT $2",
            MOVIE_COLUMNS
        );
        let limit = limit as i64;
        let rows = self.client.query(&query, &[&genre_names, &limit]).await?;
        rows.iter().map(row_to_movie).collect()
    }

    async fn rankings(&self) -> Result<Vec<Ranking>> {
        let rows = self
            .client
            .query(
                "SELECT ranking_value, ranking_name FROM rankings ORDER BY ranking_value",
                &[],
            )
            .await?;
        rows.iter()
            .map(|row| -> Result<Ranking> {
                Ok(Ranking {
                    ranking_value: row.try_get(0)?,
                    ranking_name: row.try_get(1)?,
                })
            })
            .collect()
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        let rows = self
            .client
            .query("SELECT genre_id, genre_name FROM genres ORDER BY genre_id", &[])
            .await?;
        rows.iter()
            .map(|row| -> Result<Genre> {
                Ok(Genre {
                    genre_id: row.try_get(0)?,
                    genre_name: row.try_get(1)?,
                })
            })
            .collect()
    }

    async fn seed(&self, seed: &SeedData) -> Result<()> {
        for genre in &seed.genres {
            self.client
                .execute(
                    "INSERT INTO genres (genre_id, genre_name) VALUES ($1, $2) \
                     ON CONFLICT (genre_id) DO NOTHING",
                    &[&genre.genre_id, &genre.genre_name],
                )
                .await?;
        }
        for ranking in &seed.rankings {
            self.client
                .execute(
                    "INSERT INTO rankings (ranking_value, ranking_name) VALUES ($1, $2) \
                     ON CONFLICT (ranking_value) DO NOTHING",
                    &[&ranking.ranking_value, &ranking.ranking_name],
                )
                .await?;
        }
        for movie in &seed.movies {
            match MovieStore::insert_one(self, movie.clone()).await {
                Ok(_) | Err(Error::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
