//! Catalog models

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use crate::auth::models::Genre;

/// Ranking value reserved for movies nobody has reviewed yet. It is never
/// offered to the language model as a possible label.
pub const UNRANKED_VALUE: i32 = 999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub ranking_value: i32,
    pub ranking_name: String,
}

impl Ranking {
    pub fn unranked() -> Self {
        Self {
            ranking_value: UNRANKED_VALUE,
            ranking_name: "Not_Ranked".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Movie {
    /// IMDB identifier, unique within the catalog
    #[validate(length(min = 1))]
    pub imdb_id: String,
    #[validate(length(min = 2, max = 500))]
    pub title: String,
    #[validate(url)]
    pub poster_path: String,
    /// Trailer id on YouTube
    #[validate(length(min = 1))]
    pub youtube_id: String,
    #[validate(length(min = 1))]
    pub genre: Vec<Genre>,
    #[serde(default)]
    pub admin_review: String,
    #[serde(default = "Ranking::unranked")]
    pub ranking: Ranking,
}

impl Movie {
    pub fn has_any_genre(&self, names: &[String]) -> bool {
        self.genre.iter().any(|g| names.contains(&g.genre_name))
    }
}

/// Body of an admin review update
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub admin_review: String,
}

/// Result of an admin review update
#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub ranking_name: String,
    pub admin_review: String,
}

/// Reference data loaded into a store at startup or with `magicstream seed`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub rankings: Vec<Ranking>,
    #[serde(default)]
    pub movies: Vec<Movie>,
}

impl SeedData {
    pub fn from_yaml(content: &str) -> crate::error::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}
