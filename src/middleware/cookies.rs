use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};

use crate::config::AppConfig;

pub const ACCESS_TOKEN: &str = "access_token";
pub const CART_ID: &str = "cart_id";
pub const ROLE: &str = "role";

/// Http-only, strict same-site cookie scoped to the storefront host.
pub fn session_cookie(config: &AppConfig, name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .domain(config.cookie_domain())
        .path("/")
        .http_only(true)
        .secure(config.auth.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(config.auth.token_ttl_days))
        .build()
}

/// Cookie matching [`session_cookie`]'s scope, for use with [`CookieJar::remove`].
pub fn expired_cookie(config: &AppConfig, name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .domain(config.cookie_domain())
        .path("/")
        .build()
}

pub fn cart_id(jar: &CookieJar) -> Option<String> {
    jar.get(CART_ID)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| !id.is_empty())
}
