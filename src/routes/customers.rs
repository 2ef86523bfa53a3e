use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::{
        customers::{CustomerList, UpdateCustomerRequest, WishlistRequest},
        products::ProductList,
    },
    error::AppResult,
    middleware::auth::Identity,
    models::Customer,
    response::ApiResponse,
    routes::params::{CustomerListQuery, Pagination},
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).patch(update_customer))
        .route("/me", get(get_me))
        .route("/wishlist", get(wishlist).post(add_to_wishlist))
        .route("/{id}", get(get_customer))
}

#[utoipa::path(
    get,
    path = "/api/customers/me",
    responses(
        (status = 200, description = "Signed-in customer's profile", body = ApiResponse<Customer>),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_me(
    State(state): State<AppState>,
    identity: Identity,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::get_me(&state, &identity).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/customers",
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<Customer>),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::update_customer(&state, &identity, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    params(Pagination, CustomerListQuery),
    responses(
        (status = 200, description = "Customers, newest first", body = ApiResponse<CustomerList>),
        (status = 403, description = "Admins only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    identity: Identity,
    Query(pagination): Query<Pagination>,
    Query(query): Query<CustomerListQuery>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let resp = customer_service::list_customers(&state, &identity, pagination, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer", body = ApiResponse<Customer>),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::get_customer_by_id(&state, &identity, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/customers/wishlist",
    request_body = WishlistRequest,
    responses(
        (
            status = 200,
            description = "Product on the wishlist",
            body = ApiResponse<serde_json::Value>
        ),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<WishlistRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = customer_service::add_to_wishlist(&state, &identity, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers/wishlist",
    responses(
        (status = 200, description = "Wishlisted products", body = ApiResponse<ProductList>),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Wishlist is empty"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn wishlist(
    State(state): State<AppState>,
    identity: Identity,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = customer_service::wishlist_products(&state, &identity).await?;
    Ok(Json(resp))
}
