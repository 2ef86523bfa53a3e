use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, put},
};

use crate::{
    dto::settings::{UpsertSettingsRequest, VariantTaxonomyInput},
    error::AppResult,
    middleware::auth::Identity,
    models::ProductSettings,
    response::ApiResponse,
    services::settings_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_settings).put(upsert_settings))
        .route("/{id}/variants", put(upsert_variant))
        .route("/{id}/variants/{variant_id}", delete(delete_variant))
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (
            status = 200,
            description = "Catalog categories and variant taxonomies",
            body = ApiResponse<ProductSettings>
        ),
        (status = 404, description = "Product settings not found"),
    ),
    tag = "Settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductSettings>>> {
    let resp = settings_service::get_settings(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = UpsertSettingsRequest,
    responses(
        (
            status = 200,
            description = "Settings created, or updated when `id` is set",
            body = ApiResponse<ProductSettings>
        ),
        (status = 400, description = "Duplicate categories or settings already exist"),
        (status = 403, description = "Admins only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn upsert_settings(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<UpsertSettingsRequest>,
) -> AppResult<Json<ApiResponse<ProductSettings>>> {
    let resp = settings_service::upsert_settings(&state, &identity, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/settings/{id}/variants",
    params(("id" = String, Path, description = "Settings ID")),
    request_body = VariantTaxonomyInput,
    responses(
        (
            status = 200,
            description = "Variant added or edited",
            body = ApiResponse<ProductSettings>
        ),
        (status = 400, description = "Duplicate variant name or option value"),
        (status = 403, description = "Admins only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn upsert_variant(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<VariantTaxonomyInput>,
) -> AppResult<Json<ApiResponse<ProductSettings>>> {
    let resp = settings_service::upsert_variant(&state, &identity, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/settings/{id}/variants/{variant_id}",
    params(
        ("id" = String, Path, description = "Settings ID"),
        ("variant_id" = String, Path, description = "Variant ID"),
    ),
    responses(
        (status = 200, description = "Variant removed", body = ApiResponse<ProductSettings>),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Settings or variant not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn delete_variant(
    State(state): State<AppState>,
    identity: Identity,
    Path((id, variant_id)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<ProductSettings>>> {
    let resp = settings_service::delete_variant(&state, &identity, &id, &variant_id).await?;
    Ok(Json(resp))
}
