use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};

use crate::{
    dto::products::{
        AddReviewRequest, ProductDetail, ProductList, TrendingRequest, UpsertProductRequest,
    },
    error::AppResult,
    middleware::auth::Identity,
    models::{Product, Review},
    response::ApiResponse,
    routes::params::{Pagination, ProductQuery, SearchQuery},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(upsert_product))
        .route("/search", get(search_products))
        .route("/out-of-stock", get(out_of_stock))
        .route("/by-name/{slug}", get(get_product_by_name))
        .route("/{id}", get(get_product).delete(delete_product))
        .route("/{id}/trending", patch(set_trending))
        .route("/{id}/reviews", post(add_review))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(Pagination, ProductQuery),
    responses(
        (status = 200, description = "Filtered product listing", body = ApiResponse<ProductList>),
        (status = 400, description = "Malformed price range"),
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, pagination, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = UpsertProductRequest,
    responses(
        (
            status = 200,
            description = "Created, or replaced when `id` is set",
            body = ApiResponse<Product>
        ),
        (status = 400, description = "Invalid prices or duplicate name"),
        (status = 403, description = "Admins only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn upsert_product(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<UpsertProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::upsert_product(&state, &identity, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/search",
    params(Pagination, SearchQuery),
    responses(
        (status = 200, description = "Products matching the term", body = ApiResponse<ProductList>),
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::search_products(&state, pagination, &query.q).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/out-of-stock",
    params(Pagination),
    responses(
        (status = 200, description = "Products with no stock", body = ApiResponse<ProductList>),
        (status = 403, description = "Admins only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn out_of_stock(
    State(state): State<AppState>,
    identity: Identity,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::out_of_stock_products(&state, &identity, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/by-name/{slug}",
    params(("slug" = String, Path, description = "Product name with spaces as hyphens")),
    responses(
        (status = 200, description = "Product with reviews", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product_by_name(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product_by_name(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product with reviews", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &identity, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/trending",
    params(("id" = String, Path, description = "Product ID")),
    request_body = TrendingRequest,
    responses(
        (status = 200, description = "Trending flag updated", body = ApiResponse<Product>),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn set_trending(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<TrendingRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::set_trending(&state, &identity, &id, payload.trending).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/reviews",
    params(("id" = String, Path, description = "Product ID")),
    request_body = AddReviewRequest,
    responses(
        (status = 200, description = "Review added", body = ApiResponse<Review>),
        (status = 400, description = "Invalid rating, not purchased or already reviewed"),
        (status = 401, description = "Customers only"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn add_review(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<AddReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = product_service::add_review(&state, &identity, &id, payload).await?;
    Ok(Json(resp))
}
