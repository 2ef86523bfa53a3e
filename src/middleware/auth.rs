use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{
    config::AuthConfig,
    dto::auth::Claims,
    error::{AppError, AppResult},
    middleware::cookies::ACCESS_TOKEN,
    state::AppState,
};

pub const CUSTOMER_ROLE: &str = "customer";
pub const ADMIN_ROLE: &str = "admin";

/// Who is making the request. Resolved once per request; a missing, expired
/// or tampered token is simply a guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Guest,
    Customer(String),
    Admin(String),
}

impl Identity {
    pub fn from_claims(claims: Claims) -> Self {
        match claims.role.as_str() {
            ADMIN_ROLE => Identity::Admin(claims.sub),
            CUSTOMER_ROLE => Identity::Customer(claims.sub),
            _ => Identity::Guest,
        }
    }

    pub fn customer_id(&self) -> Option<&str> {
        match self {
            Identity::Customer(id) => Some(id),
            _ => None,
        }
    }
}

pub fn ensure_admin(identity: &Identity) -> AppResult<&str> {
    match identity {
        Identity::Admin(id) => Ok(id),
        _ => Err(AppError::Forbidden),
    }
}

pub fn ensure_customer(identity: &Identity) -> AppResult<&str> {
    match identity {
        Identity::Customer(id) => Ok(id),
        _ => Err(AppError::Unauthorized("Please log in to continue".into())),
    }
}

pub fn issue_token(auth: &AuthConfig, subject: &str, role: &str) -> AppResult<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::days(auth.token_ttl_days))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: subject.to_string(),
        role: role.to_string(),
        iat: now.timestamp() as usize,
        nbf: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_token(auth: &AuthConfig, token: &str) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.validate_nbf = true;

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(decoded) => Some(decoded.claims),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring invalid access token");
            None
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(ACCESS_TOKEN)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| bearer_token(parts));

        Ok(token
            .and_then(|token| decode_token(&state.config.auth, &token))
            .map(Identity::from_claims)
            .unwrap_or(Identity::Guest))
    }
}
