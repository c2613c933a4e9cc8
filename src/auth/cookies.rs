//! Token cookies

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::{Duration, OffsetDateTime};

use crate::auth::jwt::{TokenPair, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};
use crate::config::{CookieConfig, SameSitePolicy};

/// Cookie carrying the access token
pub const ACCESS_COOKIE: &str = "access_token";

/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refresh_token";

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::None => SameSite::None,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::Strict => SameSite::Strict,
        }
    }
}

fn token_cookie(
    name: &'static str,
    value: String,
    max_age: Duration,
    config: &CookieConfig,
) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, value))
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site.into())
        .max_age(max_age)
        .build();

    if let Some(domain) = &config.domain {
        cookie.set_domain(domain.clone());
    }

    cookie
}

/// Add both token cookies with lifetimes matching the token expirations
pub fn set_token_cookies(jar: CookieJar, tokens: &TokenPair, config: &CookieConfig) -> CookieJar {
    jar.add(token_cookie(
        ACCESS_COOKIE,
        tokens.access_token.clone(),
        Duration::seconds(ACCESS_TOKEN_TTL_SECS),
        config,
    ))
    .add(token_cookie(
        REFRESH_COOKIE,
        tokens.refresh_token.clone(),
        Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        config,
    ))
}

/// Overwrite both token cookies with empty, already expired ones
pub fn clear_token_cookies(jar: CookieJar, config: &CookieConfig) -> CookieJar {
    let expired = |name: &'static str| {
        let mut cookie = token_cookie(name, String::new(), Duration::ZERO, config);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie
    };

    jar.add(expired(ACCESS_COOKIE)).add(expired(REFRESH_COOKIE))
}
