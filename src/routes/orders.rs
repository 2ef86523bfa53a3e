use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use axum_extra::extract::CookieJar;

use crate::{
    dto::orders::{CreateOrderRequest, CreatedOrder, EditOrderRequest, OrderList, RevenueSummary},
    error::AppResult,
    middleware::{
        auth::Identity,
        cookies::{self, CART_ID},
    },
    models::Order,
    response::ApiResponse,
    routes::params::{CustomerOrdersQuery, OrderListQuery, Pagination, RevenueQuery},
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/customer", get(customer_orders))
        .route("/revenue", get(revenue))
        .route("/{id}", get(get_order).patch(edit_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (
            status = 200,
            description = "Order placed, cart consumed",
            body = ApiResponse<CreatedOrder>
        ),
        (status = 400, description = "Cart is empty"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<CreateOrderRequest>,
) -> AppResult<(CookieJar, Json<ApiResponse<CreatedOrder>>)> {
    if payload.cart_id.is_none() {
        payload.cart_id = cookies::cart_id(&jar);
    }
    let resp = order_service::create_order(&state, payload).await?;
    let jar = jar.remove(cookies::expired_cookie(&state.config, CART_ID));
    Ok((jar, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(Pagination, OrderListQuery),
    responses(
        (status = 200, description = "All orders, newest first", body = ApiResponse<OrderList>),
        (status = 403, description = "Admins only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    identity: Identity,
    Query(pagination): Query<Pagination>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &identity, pagination, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/customer",
    params(CustomerOrdersQuery),
    responses(
        (status = 200, description = "Orders placed by a customer", body = ApiResponse<OrderList>),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No orders"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn customer_orders(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<CustomerOrdersQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp =
        order_service::get_orders_by_customer_id(&state, &identity, query.customer_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/revenue",
    params(RevenueQuery),
    responses(
        (status = 200, description = "Order count and revenue", body = ApiResponse<RevenueSummary>),
        (status = 403, description = "Admins only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn revenue(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<RevenueQuery>,
) -> AppResult<Json<ApiResponse<RevenueSummary>>> {
    let resp = order_service::revenue_summary(&state, &identity, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = ApiResponse<Order>),
        (status = 401, description = "Permission denied"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::get_order_by_id(&state, &identity, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order ID")),
    request_body = EditOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<Order>),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn edit_order(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<EditOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::edit_order(&state, &identity, &id, payload).await?;
    Ok(Json(resp))
}
