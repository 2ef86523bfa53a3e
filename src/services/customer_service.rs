use crate::{
    dto::{
        customers::{CustomerList, UpdateCustomerRequest, WishlistRequest},
        products::ProductList,
    },
    error::{AppError, AppResult},
    middleware::auth::{Identity, ensure_admin, ensure_customer},
    models::Customer,
    response::{ApiResponse, Meta},
    routes::params::{CustomerListQuery, Pagination},
    services::product_service,
    state::AppState,
};

fn customer_not_found() -> AppError {
    AppError::NotFound("Customer not found".into())
}

pub async fn get_me(state: &AppState, identity: &Identity) -> AppResult<ApiResponse<Customer>> {
    let customer_id = ensure_customer(identity)?;
    let customer = state
        .store
        .find_customer(customer_id)
        .await?
        .ok_or_else(customer_not_found)?;
    Ok(ApiResponse::success(
        "Customer retrieved successfully",
        customer,
        None,
    ))
}

/// Customers edit themselves. Admins must name the target and may also
/// change the account status.
pub async fn update_customer(
    state: &AppState,
    identity: &Identity,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let (target, is_admin) = match identity {
        Identity::Guest => {
            return Err(AppError::Unauthorized("Please log in to continue".into()));
        }
        Identity::Customer(id) => (id.clone(), false),
        Identity::Admin(_) => {
            let target = payload
                .customer_id
                .clone()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| AppError::BadRequest("Customer ID is required.".into()))?;
            (target, true)
        }
    };

    let customer = state
        .store
        .update_customer(&target, payload.into_changes(is_admin))
        .await?
        .ok_or_else(customer_not_found)?;

    tracing::info!(customer_id = %customer.id, by_admin = is_admin, "customer profile updated");
    Ok(ApiResponse::success(
        "Profile updated",
        customer,
        Some(Meta::empty()),
    ))
}

pub async fn get_customer_by_id(
    state: &AppState,
    identity: &Identity,
    id: &str,
) -> AppResult<ApiResponse<Customer>> {
    ensure_admin(identity)?;
    let customer = state
        .store
        .find_customer(id)
        .await?
        .ok_or_else(customer_not_found)?;
    Ok(ApiResponse::success(
        "Customer retrieved successfully",
        customer,
        None,
    ))
}

pub async fn list_customers(
    state: &AppState,
    identity: &Identity,
    pagination: Pagination,
    query: CustomerListQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    ensure_admin(identity)?;
    let (page, per_page, window) = pagination.page_request()?;
    let (items, total) = state.store.list_customers(query.status, window).await?;
    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        Some(Meta::new(page, per_page, total as i64)),
    ))
}

pub async fn add_to_wishlist(
    state: &AppState,
    identity: &Identity,
    payload: WishlistRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let customer_id = ensure_customer(identity)?;

    if state.store.find_product(&payload.product_id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".into()));
    }

    let added = state
        .store
        .add_to_wishlist(customer_id, &payload.product_id)
        .await?
        .ok_or_else(customer_not_found)?;

    let message = if added {
        "Product added to wishlist"
    } else {
        "Product already in wishlist"
    };
    Ok(ApiResponse::success(
        message,
        serde_json::json!({ "product_id": payload.product_id }),
        Some(Meta::empty()),
    ))
}

pub async fn wishlist_products(
    state: &AppState,
    identity: &Identity,
) -> AppResult<ApiResponse<ProductList>> {
    let customer_id = ensure_customer(identity)?;
    let customer = state
        .store
        .find_customer(customer_id)
        .await?
        .ok_or_else(customer_not_found)?;

    let products = state.store.find_products_by_ids(&customer.wishlist).await?;
    if products.is_empty() {
        return Err(AppError::NotFound("No products in wishlist".into()));
    }
    let items = product_service::with_reviews(state, products).await?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Wishlist products",
        ProductList { items },
        Some(Meta::new(1, total, total)),
    ))
}
