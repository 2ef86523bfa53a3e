use axum::{Json, Router, http::StatusCode, http::Uri, routing::get};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod auth;
pub mod cart;
pub mod customers;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod newsletter;
pub mod orders;
pub mod params;
pub mod payments;
pub mod products;
pub mod settings;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/settings", settings::router())
        .nest("/auth", auth::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/customers", customers::router())
        .nest("/payments", payments::router())
        .nest("/dashboard", dashboard::router())
        .nest("/newsletter", newsletter::router())
}

/// Health check, the `/api` tree, the docs UI and the JSON 404 fallback.
/// Middleware layers are added by the binary.
pub fn app_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let mut body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    body.status = StatusCode::NOT_FOUND.as_u16();
    (StatusCode::NOT_FOUND, Json(body))
}
