use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, patch},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    dto::cart::{AddItemRequest, CartView, ChangeQuantityRequest, RemoveItemRequest},
    error::AppResult,
    middleware::{
        auth::Identity,
        cookies::{self, CART_ID},
    },
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CartQuery {
    /// Falls back to the `cart_id` cookie when omitted.
    pub cart_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).post(add_item).delete(remove_item))
        .route("/quantity", patch(change_quantity))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(CartQuery),
    responses(
        (status = 200, description = "Cart for the caller", body = ApiResponse<CartView>),
        (status = 404, description = "Cart not found"),
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    identity: Identity,
    jar: CookieJar,
    Query(query): Query<CartQuery>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart_id = query.cart_id.or_else(|| cookies::cart_id(&jar));
    let resp = cart_service::get_cart(&state, &identity, cart_id.as_deref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddItemRequest,
    responses(
        (
            status = 200,
            description = "Item added, `cart_id` cookie set",
            body = ApiResponse<CartView>
        ),
    ),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    identity: Identity,
    jar: CookieJar,
    Json(mut payload): Json<AddItemRequest>,
) -> AppResult<(CookieJar, Json<ApiResponse<CartView>>)> {
    if payload.cart_id.is_none() {
        payload.cart_id = cookies::cart_id(&jar);
    }
    let resp = cart_service::add_item(&state, &identity, payload).await?;

    let cart_id = resp
        .data
        .as_ref()
        .map(|cart| cart.id.clone())
        .unwrap_or_default();
    let jar = jar.add(cookies::session_cookie(&state.config, CART_ID, cart_id));
    Ok((jar, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/cart/quantity",
    request_body = ChangeQuantityRequest,
    responses(
        (status = 200, description = "Quantity changed", body = ApiResponse<CartView>),
        (status = 400, description = "Item missing or not enough stock"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "Cart"
)]
pub async fn change_quantity(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<ChangeQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    if payload.cart_id.is_none() {
        payload.cart_id = cookies::cart_id(&jar);
    }
    let resp = cart_service::change_quantity(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    request_body = RemoveItemRequest,
    responses(
        (status = 200, description = "Item removed", body = ApiResponse<CartView>),
        (status = 400, description = "Item not in cart"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<RemoveItemRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    if payload.cart_id.is_none() {
        payload.cart_id = cookies::cart_id(&jar);
    }
    let resp = cart_service::remove_item(&state, payload).await?;
    Ok(Json(resp))
}
