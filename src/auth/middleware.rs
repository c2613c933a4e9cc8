//! Authentication middleware and extractors

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::api::SharedState;
use crate::auth::cookies::ACCESS_COOKIE;
use crate::auth::jwt::TokenCodec;
use crate::auth::models::{Identity, Role};
use crate::error::{AuthFailure, Error, Result};

/// Turn the raw access cookie value into a request identity
pub fn authenticate(token: Option<&str>, codec: &TokenCodec) -> Result<Identity> {
    let token = token.ok_or(Error::Unauthenticated(AuthFailure::MissingToken))?;
    if token.is_empty() {
        return Err(Error::Unauthenticated(AuthFailure::EmptyToken));
    }

    let claims = codec.parse_access(token)?;
    Ok(claims.identity())
}

/// Middleware for requiring a valid access token cookie.
///
/// On success the caller's [`Identity`] is stored in the request extensions.
/// It never touches the store.
pub async fn auth_gate(
    State(state): State<SharedState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = jar.get(ACCESS_COOKIE).map(|c| c.value());
    let identity = authenticate(token, &state.codec)?;

    tracing::debug!(user_id = %identity.user_id, role = %identity.role, "Request authenticated");
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(Error::Unauthenticated(AuthFailure::MissingIdentity))
    }
}

impl<S> OptionalFromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().cloned())
    }
}

/// Exact role match. A missing identity is refused as `Forbidden`.
pub fn require_role(identity: Option<&Identity>, required: Role) -> Result<()> {
    match identity {
        Some(identity) if identity.role == required.as_str() => Ok(()),
        Some(identity) => Err(Error::Forbidden(format!(
            "role {} may not perform this action",
            identity.role
        ))),
        None => Err(Error::Forbidden("no identity on request".to_string())),
    }
}
