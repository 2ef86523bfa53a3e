use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::dashboard::{CollectionCount, SoldProductsList},
    error::AppResult,
    middleware::auth::Identity,
    response::ApiResponse,
    routes::params::CountQuery,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sold-products", get(sold_products))
        .route("/count", get(count))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/sold-products",
    responses(
        (
            status = 200,
            description = "Line items of last month's orders",
            body = ApiResponse<SoldProductsList>
        ),
        (status = 403, description = "Admins only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn sold_products(
    State(state): State<AppState>,
    identity: Identity,
) -> AppResult<Json<ApiResponse<SoldProductsList>>> {
    let resp = dashboard_service::sold_products(&state, &identity).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/count",
    params(CountQuery),
    responses(
        (
            status = 200,
            description = "Documents in the collection",
            body = ApiResponse<CollectionCount>
        ),
        (status = 403, description = "Admins only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn count(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<CountQuery>,
) -> AppResult<Json<ApiResponse<CollectionCount>>> {
    let resp = dashboard_service::count(&state, &identity, query.model).await?;
    Ok(Json(resp))
}
