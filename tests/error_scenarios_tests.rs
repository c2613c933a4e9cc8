//! Error scenario and edge case tests
//! Tests error conditions across configuration, startup and the error taxonomy
//!
//! Run with: cargo test --test error_scenarios_tests
//! Covers:
//! - Configuration errors
//! - Missing signing secrets
//! - Store setup failures
//! - Client facing error mapping

use std::fs;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use magicstream::api::AppState;
use magicstream::auth::Role;
use magicstream::catalog::models::SeedData;
use magicstream::config::{load_config_from_path, DatabaseConfig, StoreBackend};
use magicstream::error::{AuthFailure, Error, TokenError};
use magicstream::store::{self, MemoryStore, MovieStore, Stores};
use magicstream::Config;
use tempfile::TempDir;

// ============================================================================
// Configuration Error Tests
// ============================================================================

#[test]
fn test_error_config_not_found() {
    let dir = TempDir::new().unwrap();
    let result = load_config_from_path(&dir.path().join("magicstream.toml"));
    assert!(matches!(result, Err(Error::ConfigNotFound)));
    println!("✓ ConfigNotFound error: {}", result.unwrap_err());
}

#[test]
fn test_error_config_invalid_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("magicstream.toml");
    fs::write(&path, "this is [ not valid toml").unwrap();

    let result = load_config_from_path(&path);
    assert!(matches!(result, Err(Error::TomlParse(_))));
    println!("✓ TOML parse error detected");
}

#[test]
fn test_config_env_interpolation_from_file() {
    std::env::set_var("MS_ERR_TEST_ACCESS", "from-env");
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("magicstream.toml");
    fs::write(
        &path,
        r#"
[auth]
access_secret = "${MS_ERR_TEST_ACCESS}"
refresh_secret = "${MS_ERR_TEST_UNSET:-fallback}"

[catalog]
recommended_movie_limit = ${MS_ERR_TEST_LIMIT:-3}
"#,
    )
    .unwrap();

    let config = load_config_from_path(&path).unwrap();
    assert_eq!(config.auth.access_secret, "from-env");
    assert_eq!(config.auth.refresh_secret, "fallback");
    assert_eq!(config.catalog.recommended_movie_limit, 3);
    std::env::remove_var("MS_ERR_TEST_ACCESS");
    println!("✓ Environment interpolation applied");
}

#[test]
fn test_blank_prompt_template_uses_builtin() {
    let config: Config = toml::from_str("[sentiment]\nprompt_template = \"  \"\n").unwrap();
    let builtin: Config = toml::from_str("").unwrap();
    assert_eq!(config.sentiment.template(), builtin.sentiment.prompt_template);
    assert!(config.sentiment.template().contains("{{ review }}"));
    println!("✓ Blank prompt template falls back to the built-in one");
}

#[test]
fn test_config_defaults_when_sections_missing() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.database.timeout_secs, 100);
    assert_eq!(config.catalog.recommended_movie_limit, 5);
    assert!(config.auth.cookies.secure);
    assert!(config.sentiment.api_key().is_none());
}

#[test]
fn test_blank_api_key_counts_as_missing() {
    let config: Config = toml::from_str("[sentiment]\napi_key = \"  \"").unwrap();
    assert!(config.sentiment.api_key().is_none());
}

// ============================================================================
// Startup Error Tests
// ============================================================================

#[test]
fn test_missing_secret_is_fatal() {
    let config = Config::default();
    assert!(matches!(config.auth.validate(), Err(Error::Config(_))));

    let result = AppState::new(config, Stores::from_backend(MemoryStore::new()));
    assert!(matches!(result, Err(Error::Config(_))));
    println!("✓ Startup refused without signing secrets");
}

#[tokio::test]
async fn test_postgres_backend_requires_url() {
    let config = DatabaseConfig {
        backend: StoreBackend::Postgres,
        url: None,
        ..DatabaseConfig::default()
    };
    let result = store::connect(&config).await;
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn test_missing_seed_file() {
    let dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        seed_file: Some(dir.path().join("missing.yaml")),
        ..DatabaseConfig::default()
    };
    let result = store::connect(&config).await;
    assert!(matches!(result, Err(Error::Io(_))));
}

#[tokio::test]
async fn test_seed_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seed.yaml");
    fs::write(
        &path,
        r#"
genres:
  - genre_id: 1
    genre_name: Western
rankings:
  - ranking_value: 1
    ranking_name: Excellent
movies:
  - imdb_id: tt0060196
    title: The Good, the Bad and the Ugly
    poster_path: https://image.example.com/gbu.jpg
    youtube_id: WCN5JJY_wiA
    genre:
      - genre_id: 1
        genre_name: Western
"#,
    )
    .unwrap();

    let config = DatabaseConfig {
        seed_file: Some(path),
        ..DatabaseConfig::default()
    };
    let stores = store::connect(&config).await.unwrap();
    let movies = stores.movies.find_all().await.unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].ranking.ranking_value, 999);
    assert_eq!(stores.movies.genres().await.unwrap().len(), 1);
}

#[test]
fn test_invalid_seed_yaml() {
    let result = SeedData::from_yaml("movies: [ {imdb_id: ");
    assert!(matches!(result, Err(Error::YamlParse(_))));
}

// ============================================================================
// Error Mapping Tests
// ============================================================================

#[test]
fn test_status_codes() {
    let cases = [
        (Error::Unauthenticated(AuthFailure::MissingToken), StatusCode::UNAUTHORIZED),
        (Error::Forbidden("role".to_string()), StatusCode::FORBIDDEN),
        (Error::Conflict("dup".to_string()), StatusCode::CONFLICT),
        (Error::NotFound("gone".to_string()), StatusCode::NOT_FOUND),
        (Error::Validation("shape".to_string()), StatusCode::BAD_REQUEST),
        (Error::Signing("key".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        (
            Error::Timeout(std::time::Duration::from_secs(100)),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        assert_eq!(err.status_code(), status, "{}", err);
    }
}

#[tokio::test]
async fn test_server_fault_body_hides_detail() {
    let err = Error::Sentiment("upstream said: invalid api key sk-live-123".to_string());
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!body.contains("sk-live-123"));
    assert!(body.contains("Internal server error"));
}

#[tokio::test]
async fn test_unauthenticated_bodies_identical() {
    let expired = Error::from(TokenError::Expired).into_response();
    let missing = Error::Unauthenticated(AuthFailure::MissingToken).into_response();

    let a = expired.into_body().collect().await.unwrap().to_bytes();
    let b = missing.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(a, b);
}

#[test]
fn test_unknown_role_rejected() {
    let result: Result<Role, _> = "SUPERUSER".parse();
    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
}
