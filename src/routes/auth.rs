use axum::{Json, Router, extract::State, routing::post};
use axum_extra::extract::CookieJar;

use crate::{
    dto::auth::{
        ChangeAdminPasswordRequest, ChangePasswordRequest, LoginRequest, LoginResponse,
        RegisterRequest, ResetPasswordRequest, VerificationCodeRequest,
    },
    error::AppResult,
    middleware::{
        auth::{ADMIN_ROLE, Identity},
        cookies::{self, ACCESS_TOKEN, CART_ID, ROLE},
    },
    models::Customer,
    response::{ApiResponse, Meta},
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/admin/login", post(admin_login))
        .route("/logout", post(logout))
        .route("/verification-code", post(send_verification_code))
        .route("/reset-password", post(reset_password))
        .route("/change-password", post(change_password))
        .route("/admin/change-password", post(change_admin_password))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Customer account created", body = ApiResponse<Customer>),
        (status = 400, description = "Email is already taken"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = auth_service::register(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (
            status = 200,
            description = "Sets `access_token` and re-issues `cart_id`",
            body = ApiResponse<LoginResponse>
        ),
        (status = 400, description = "Unknown email, suspended account or wrong password"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<ApiResponse<LoginResponse>>)> {
    let resp = auth_service::login(&state, payload).await?;

    let mut jar = jar.remove(cookies::expired_cookie(&state.config, CART_ID));
    if let Some(login) = resp.data.as_ref() {
        jar = jar.add(cookies::session_cookie(
            &state.config,
            ACCESS_TOKEN,
            login.token.clone(),
        ));
        if let Some(cart_id) = login.cart_id.clone() {
            jar = jar.add(cookies::session_cookie(&state.config, CART_ID, cart_id));
        }
    }
    Ok((jar, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/admin/login",
    request_body = LoginRequest,
    responses(
        (
            status = 200,
            description = "Sets `access_token` and `role`",
            body = ApiResponse<LoginResponse>
        ),
        (status = 400, description = "Unknown email or wrong password"),
    ),
    tag = "Auth"
)]
pub async fn admin_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<ApiResponse<LoginResponse>>)> {
    let resp = auth_service::admin_login(&state, payload).await?;

    let mut jar = jar;
    if let Some(login) = resp.data.as_ref() {
        jar = jar
            .add(cookies::session_cookie(
                &state.config,
                ACCESS_TOKEN,
                login.token.clone(),
            ))
            .add(cookies::session_cookie(
                &state.config,
                ROLE,
                ADMIN_ROLE.to_string(),
            ));
    }
    Ok((jar, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (
            status = 200,
            description = "Clears `access_token` and `role`",
            body = ApiResponse<serde_json::Value>
        ),
    ),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<serde_json::Value>>) {
    let jar = jar
        .remove(cookies::expired_cookie(&state.config, ACCESS_TOKEN))
        .remove(cookies::expired_cookie(&state.config, ROLE));
    let body = ApiResponse::success(
        "Logged out",
        serde_json::json!({}),
        Some(Meta::empty()),
    );
    (jar, Json(body))
}

#[utoipa::path(
    post,
    path = "/api/auth/verification-code",
    request_body = VerificationCodeRequest,
    responses(
        (status = 200, description = "Code emailed", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Code already pending or email not registered"),
    ),
    tag = "Auth"
)]
pub async fn send_verification_code(
    State(state): State<AppState>,
    Json(payload): Json<VerificationCodeRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::send_verification_code(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Passwords do not match"),
        (status = 401, description = "Invalid or expired verification code"),
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::reset_password(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Passwords do not match"),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::change_password(&state, &identity, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/admin/change-password",
    request_body = ChangeAdminPasswordRequest,
    responses(
        (
            status = 200,
            description = "Password changed, session cookies cleared",
            body = ApiResponse<serde_json::Value>
        ),
        (status = 400, description = "Passwords do not match"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Admin not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_admin_password(
    State(state): State<AppState>,
    identity: Identity,
    jar: CookieJar,
    Json(payload): Json<ChangeAdminPasswordRequest>,
) -> AppResult<(CookieJar, Json<ApiResponse<serde_json::Value>>)> {
    let resp = auth_service::change_admin_password(&state, &identity, payload).await?;
    let jar = jar
        .remove(cookies::expired_cookie(&state.config, ACCESS_TOKEN))
        .remove(cookies::expired_cookie(&state.config, ROLE));
    Ok((jar, Json(resp)))
}
