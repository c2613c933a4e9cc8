//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub sentiment: SentimentConfig,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to make credentialed cross-site requests
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Token signing secrets and cookie attributes
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    #[serde(default)]
    pub access_secret: String,

    /// HMAC secret for refresh tokens
    #[serde(default)]
    pub refresh_secret: String,

    #[serde(default)]
    pub cookies: CookieConfig,
}

impl AuthConfig {
    /// Both secrets must be present before any token can be signed
    pub fn validate(&self) -> Result<()> {
        if self.access_secret.trim().is_empty() {
            return Err(Error::Config("auth.access_secret is not set".to_string()));
        }
        if self.refresh_secret.trim().is_empty() {
            return Err(Error::Config("auth.refresh_secret is not set".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "default_cookie_path")]
    pub path: String,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default = "default_cookie_secure")]
    pub secure: bool,

    #[serde(default)]
    pub same_site: SameSitePolicy,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_cookie_secure() -> bool {
    true
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            path: default_cookie_path(),
            domain: None,
            secure: default_cookie_secure(),
            same_site: SameSitePolicy::default(),
        }
    }
}

/// SameSite mode for the token cookies. `None` is what lets a browser
/// frontend on another origin send them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    #[default]
    None,
    Lax,
    Strict,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Connection string for the postgres backend
    #[serde(default)]
    pub url: Option<String>,

    /// Upper bound on any single store or hashing call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// YAML file with genres, rankings and movies loaded at startup
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    100
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: None,
            timeout_secs: default_timeout_secs(),
            seed_file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

/// Catalog behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_recommended_movie_limit")]
    pub recommended_movie_limit: usize,
}

fn default_recommended_movie_limit() -> usize {
    5
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            recommended_movie_limit: default_recommended_movie_limit(),
        }
    }
}

/// Language model used to rank admin reviews
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// minijinja template; `rankings` and `review` are in scope
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

pub(crate) fn default_prompt_template() -> String {
    "Return a response using one of these words: {{ rankings }}. \
     The response should be a single word and should not contain any other text. \
     The response should be based on the following review: {{ review }}"
        .to_string()
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            prompt_template: default_prompt_template(),
        }
    }
}

impl SentimentConfig {
    /// An api key that is present and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// The configured prompt, or the built-in one when left blank
    pub fn template(&self) -> String {
        if self.prompt_template.trim().is_empty() {
            default_prompt_template()
        } else {
            self.prompt_template.clone()
        }
    }
}
