use crate::{
    dto::cart::{AddItemRequest, CartView, ChangeQuantityRequest, QuantityAction, RemoveItemRequest},
    error::{AppError, AppResult},
    ids::{is_guest_id, new_guest_id},
    middleware::auth::Identity,
    models::Cart,
    response::{ApiResponse, Meta},
    state::AppState,
};

fn cart_not_found() -> AppError {
    AppError::NotFound("Cart not found".into())
}

async fn load_cart(state: &AppState, cart_id: Option<&str>) -> AppResult<Cart> {
    let cart_id = cart_id.ok_or_else(cart_not_found)?;
    state
        .store
        .find_cart(cart_id)
        .await?
        .ok_or_else(cart_not_found)
}

async fn save(state: &AppState, cart: &Cart) -> AppResult<Cart> {
    state.store.save_cart(cart).await?.ok_or_else(cart_not_found)
}

/// Adds one unit of an item, creating the cart on first use. The owner of a
/// new cart is the signed-in customer, or a fresh guest id.
pub async fn add_item(
    state: &AppState,
    identity: &Identity,
    payload: AddItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    let existing = match payload.cart_id.as_deref() {
        Some(id) => state.store.find_cart(id).await?,
        None => None,
    };

    let message = if existing.is_some() {
        "Successfully updated the cart"
    } else {
        "Successfully created the cart"
    };

    let owner_id = existing
        .map(|cart| cart.owner_id)
        .or_else(|| identity.customer_id().map(str::to_string))
        .unwrap_or_else(new_guest_id);

    let cart = state
        .store
        .upsert_cart_item(&owner_id, payload.into_line_item())
        .await?;

    tracing::debug!(cart_id = %cart.id, items = cart.products.len(), "cart item added");

    Ok(ApiResponse::success(
        message,
        CartView::from(cart),
        Some(Meta::empty()),
    ))
}

pub async fn change_quantity(
    state: &AppState,
    payload: ChangeQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    let ChangeQuantityRequest {
        cart_id,
        product_id,
        variant_id,
        action,
    } = payload;

    let mut cart = load_cart(state, cart_id.as_deref()).await?;

    let quantity = cart
        .item_mut(&product_id, variant_id.as_deref())
        .map(|item| item.quantity)
        .ok_or_else(|| AppError::BadRequest("Item not available in cart".into()))?;

    let stock = state
        .store
        .find_product(&product_id)
        .await?
        .map(|product| product.available_stock(variant_id.as_deref()))
        .ok_or_else(|| AppError::BadRequest("Product stock information not found".into()))?;

    let next = match action {
        QuantityAction::Decrement => (quantity - 1).max(1),
        QuantityAction::Increment => {
            if quantity >= stock {
                return Err(AppError::InsufficientStock { available: stock });
            }
            quantity + 1
        }
    };

    if let Some(item) = cart.item_mut(&product_id, variant_id.as_deref()) {
        item.quantity = next;
    }
    let cart = save(state, &cart).await?;

    Ok(ApiResponse::success(
        "Successfully updated the quantity",
        CartView::from(cart),
        Some(Meta::empty()),
    ))
}

pub async fn remove_item(
    state: &AppState,
    payload: RemoveItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    let mut cart = load_cart(state, payload.cart_id.as_deref()).await?;

    if !cart.remove_item(&payload.product_id, payload.variant_id.as_deref()) {
        return Err(AppError::BadRequest("Item not found in cart".into()));
    }
    let cart = save(state, &cart).await?;

    Ok(ApiResponse::success(
        "Product removed from cart successfully",
        CartView::from(cart),
        Some(Meta::empty()),
    ))
}

/// Customers only see their own cart. Everyone else (admins included) only
/// sees guest carts. A cart the caller may not see reads as missing.
pub async fn get_cart(
    state: &AppState,
    identity: &Identity,
    cart_id: Option<&str>,
) -> AppResult<ApiResponse<CartView>> {
    let cart = load_cart(state, cart_id).await?;

    let visible = match identity {
        Identity::Customer(id) => cart.owner_id == *id,
        Identity::Guest | Identity::Admin(_) => is_guest_id(&cart.owner_id),
    };
    if !visible {
        return Err(cart_not_found());
    }

    Ok(ApiResponse::success(
        "Cart retrieved successfully",
        CartView::from(cart),
        Some(Meta::empty()),
    ))
}
