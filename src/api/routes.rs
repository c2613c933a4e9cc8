//! API route handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use super::server::SharedState;
use crate::auth::models::{Identity, LoginRequest, LogoutRequest, RegisterRequest, Registered, UserResponse};
use crate::auth::{clear_token_cookies, set_token_cookies, REFRESH_COOKIE};
use crate::catalog::models::{Genre, Movie, ReviewRequest, ReviewResponse};
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>>;

// Health check

pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("healthy"))
}

// Session routes

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Registered>>)> {
    let registered = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(registered))))
}

/// Tokens travel only as cookies, never in the body
pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<UserResponse>>)> {
    let (user, tokens) = state.auth.login(req).await?;
    let jar = set_token_cookies(jar, &tokens, &state.config.auth.cookies);
    Ok((jar, Json(ApiResponse::ok(user))))
}

/// Logs out the authenticated caller. A `user_id` in the body must name
/// that same caller.
pub async fn logout(
    State(state): State<SharedState>,
    identity: Identity,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<ApiResponse<&'static str>>)> {
    let req: LogoutRequest = if body.is_empty() {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| Error::Validation(format!("invalid logout body: {}", e)))?
    };

    if let Some(user_id) = req.user_id.as_deref() {
        if user_id != identity.user_id {
            return Err(Error::Forbidden(
                "cannot log out another user".to_string(),
            ));
        }
    }

    state.auth.logout(&identity.user_id).await?;

    let jar = clear_token_cookies(jar, &state.config.auth.cookies);
    Ok((jar, Json(ApiResponse::ok("Logged out successfully"))))
}

pub async fn refresh(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<&'static str>>)> {
    let token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    let tokens = state.auth.refresh(token.as_deref()).await?;

    let jar = set_token_cookies(jar, &tokens, &state.config.auth.cookies);
    Ok((jar, Json(ApiResponse::ok("Tokens refreshed"))))
}

// Catalog routes

pub async fn get_movies(State(state): State<SharedState>) -> ApiResult<Vec<Movie>> {
    let movies = state.catalog.get_movies().await?;
    Ok(Json(ApiResponse::ok(movies)))
}

pub async fn get_movie(
    State(state): State<SharedState>,
    Path(imdb_id): Path<String>,
) -> ApiResult<Movie> {
    let movie = state.catalog.get_movie(&imdb_id).await?;
    Ok(Json(ApiResponse::ok(movie)))
}

pub async fn add_movie(
    State(state): State<SharedState>,
    Json(movie): Json<Movie>,
) -> Result<(StatusCode, Json<ApiResponse<String>>)> {
    let imdb_id = state.catalog.add_movie(movie).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(imdb_id))))
}

pub async fn genres(State(state): State<SharedState>) -> ApiResult<Vec<Genre>> {
    let genres = state.catalog.genres().await?;
    Ok(Json(ApiResponse::ok(genres)))
}

pub async fn recommended_movies(
    State(state): State<SharedState>,
    identity: Identity,
) -> ApiResult<Vec<Movie>> {
    let movies = state.catalog.recommended_movies(&identity.user_id).await?;
    Ok(Json(ApiResponse::ok(movies)))
}

pub async fn admin_review_update(
    State(state): State<SharedState>,
    identity: Option<Identity>,
    Path(imdb_id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> ApiResult<ReviewResponse> {
    let review = state
        .catalog
        .admin_review_update(identity.as_ref(), &imdb_id, &req.admin_review)
        .await?;
    Ok(Json(ApiResponse::ok(review)))
}
