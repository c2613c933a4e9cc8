//! HTTP API server

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{auth_gate, AuthService, TokenCodec};
use crate::catalog::Catalog;
use crate::config::{Config, ServerConfig};
use crate::error::Result;
use crate::sentiment::OpenAiClassifier;
use crate::store::{self, Stores};

use super::routes;

/// Application state shared across handlers. Read-only once built.
pub struct AppState {
    pub config: Config,
    pub codec: Arc<TokenCodec>,
    pub auth: AuthService,
    pub catalog: Catalog,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire the services over `stores`. Fails when a signing secret is missing.
    pub fn new(config: Config, stores: Stores) -> Result<Self> {
        let codec = Arc::new(TokenCodec::from_config(&config.auth)?);
        let timeout = config.database.timeout();

        let auth = AuthService::new(stores.users.clone(), codec.clone(), timeout);

        let mut catalog = Catalog::new(
            stores.movies,
            stores.users,
            config.sentiment.template(),
            config.catalog.recommended_movie_limit,
            timeout,
        );
        match OpenAiClassifier::from_config(&config.sentiment) {
            Some(classifier) => catalog = catalog.with_classifier(Arc::new(classifier)),
            None => tracing::warn!("No sentiment api key configured, review updates are disabled"),
        }

        Ok(Self {
            config,
            codec,
            auth,
            catalog,
        })
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let stores = store::connect(&config.database).await?;
    let state = Arc::new(AppState::new(config, stores)?);

    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let protected = Router::new()
        .route("/logout", post(routes::logout))
        .route("/movie/{imdb_id}", get(routes::get_movie))
        .route("/addmovie", post(routes::add_movie))
        .route("/updatereview/{imdb_id}", patch(routes::admin_review_update))
        .route("/recommendedmovies", get(routes::recommended_movies))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_gate));

    Router::new()
        .route("/health", get(routes::health))
        .route("/movies", get(routes::get_movies))
        .route("/register", post(routes::register))
        .route("/login", post(routes::login))
        .route("/genres", get(routes::genres))
        .route("/refresh", post(routes::refresh))
        .merge(protected)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.server))
        .with_state(state)
}

/// CORS for the configured frontend origins, with cookies allowed
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60))
}
