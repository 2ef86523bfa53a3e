use chrono::{Duration, Utc};
use futures::future::join_all;

use crate::{
    dto::orders::{CreateOrderRequest, CreatedOrder, EditOrderRequest, OrderList, RevenueSummary},
    error::{AppError, AppResult},
    ids::{is_guest_id, new_document_id},
    middleware::auth::{Identity, ensure_admin},
    models::{DeliveryStatus, LineItem, Order, OrderChanges, OrderCustomer},
    notifications::{EmailTemplate, Notification},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination, RevenueQuery},
    state::AppState,
    store::StockDecrement,
};

fn order_not_found() -> AppError {
    AppError::NotFound("Order not found".into())
}

/// Turns a cart into an order.
///
/// The steps run in sequence against separate documents with no rollback:
/// once the order is stored the cart is deleted, then stock is decremented
/// for every line item concurrently. A failed decrement is logged and does
/// not affect the order. Confirmation emails are queued last.
pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<CreatedOrder>> {
    let cart_id = payload
        .cart_id
        .as_deref()
        .ok_or_else(|| AppError::NotFound("Cart not found".into()))?;
    let cart = state
        .store
        .find_cart(cart_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".into()))?;

    if cart.products.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let now = Utc::now();
    let order = Order {
        id: new_document_id(),
        customer: OrderCustomer {
            customer_id: cart.owner_id.clone(),
            name: payload.customer.name,
            email: payload.customer.email,
            phone_number: payload.customer.phone_number,
            address: payload.customer.address,
        },
        products: cart.products.clone(),
        applied_coupon: payload.applied_coupon,
        coupon_discount: payload.coupon_discount,
        payment_method: payload.payment_method,
        payment_status: payload.payment_status,
        delivery_status: DeliveryStatus::Processing,
        mrp: payload.mrp,
        taxes: payload.taxes,
        total_amount: payload.total_amount,
        shipping_fees: payload.shipping_fees,
        expected_delivery: payload.expected_delivery,
        tracking_link: None,
        created_at: now,
        updated_at: now,
    };

    state.store.insert_order(&order).await?;

    if !state.store.delete_cart(&cart.id).await? {
        tracing::warn!(cart_id = %cart.id, "cart vanished before it could be deleted");
    }

    decrement_stock(state, &order.id, &order.products).await;

    state.outbox.enqueue(Notification::for_order(
        EmailTemplate::OrderConfirmation,
        &order,
        None,
    ));
    state.outbox.enqueue(Notification::for_order(
        EmailTemplate::NewOrderAlert,
        &order,
        Some(state.config.store.admin_email.as_str()),
    ));

    tracing::info!(
        order_id = %order.id,
        items = order.products.len(),
        total = order.total_amount,
        "order created"
    );

    Ok(ApiResponse::success(
        "Successfully created the order",
        CreatedOrder { id: order.id },
        Some(Meta::empty()),
    ))
}

async fn decrement_stock(state: &AppState, order_id: &str, items: &[LineItem]) {
    let updates = items.iter().map(|item| async move {
        let result = state
            .store
            .decrement_stock(&item.product_id, item.variant_id.as_deref(), item.quantity)
            .await;
        (item, result)
    });

    for (item, result) in join_all(updates).await {
        match result {
            Ok(Some(outcome)) if outcome.remaining() < 0 => {
                let level = match outcome {
                    StockDecrement::Variant { .. } => "variant",
                    StockDecrement::Product { .. } => "product",
                };
                tracing::warn!(
                    order_id,
                    product_id = %item.product_id,
                    variant_id = ?item.variant_id,
                    level,
                    remaining = outcome.remaining(),
                    "stock oversold"
                );
            }
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::warn!(
                    order_id,
                    product_id = %item.product_id,
                    "ordered product no longer exists, stock not updated"
                );
            }
            Err(err) => {
                tracing::warn!(
                    order_id,
                    product_id = %item.product_id,
                    error = %err,
                    "stock update failed"
                );
            }
        }
    }
}

pub async fn edit_order(
    state: &AppState,
    identity: &Identity,
    id: &str,
    payload: EditOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(identity)?;

    let changes = OrderChanges {
        payment_status: payload.payment_status,
        delivery_status: payload.delivery_status,
        tracking_link: payload.tracking_link.filter(|link| !link.is_empty()),
    };

    let order = state
        .store
        .update_order(id, &changes)
        .await?
        .ok_or_else(order_not_found)?;

    // Fires on every request naming the status, not only on transitions.
    let template = match changes.delivery_status {
        Some(DeliveryStatus::Shipped) => Some(EmailTemplate::OrderShipped),
        Some(DeliveryStatus::Delivered) => Some(EmailTemplate::OrderDelivered),
        Some(DeliveryStatus::Processing) | None => None,
    };
    if let Some(template) = template {
        state
            .outbox
            .enqueue(Notification::for_order(template, &order, None));
    }

    Ok(ApiResponse::success(
        "Successfully updated the order",
        order,
        Some(Meta::empty()),
    ))
}

pub async fn get_order_by_id(
    state: &AppState,
    identity: &Identity,
    id: &str,
) -> AppResult<ApiResponse<Order>> {
    let order = state
        .store
        .find_order(id)
        .await?
        .ok_or_else(order_not_found)?;

    let owner = &order.customer.customer_id;
    let allowed = match identity {
        Identity::Admin(_) => true,
        Identity::Customer(customer_id) => owner == customer_id,
        Identity::Guest => is_guest_id(owner),
    };
    if !allowed {
        return Err(AppError::Unauthorized("Permission denied".into()));
    }

    Ok(ApiResponse::success("Order", order, Some(Meta::empty())))
}

pub async fn get_orders_by_customer_id(
    state: &AppState,
    identity: &Identity,
    customer_id: Option<String>,
) -> AppResult<ApiResponse<OrderList>> {
    let customer_id = match identity {
        Identity::Guest => {
            return Err(AppError::Unauthorized(
                "Unauthorized access: Permission denied".into(),
            ));
        }
        Identity::Customer(id) => id.clone(),
        Identity::Admin(_) => customer_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest("Customer ID is required.".into()))?,
    };

    let orders = state.store.find_orders_by_customer(&customer_id).await?;
    if orders.is_empty() {
        return Err(AppError::NotFound(
            "No orders found for the specified customer.".into(),
        ));
    }

    let total = orders.len() as i64;
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn list_orders(
    state: &AppState,
    identity: &Identity,
    pagination: Pagination,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(identity)?;
    let (page, per_page, window) = pagination.page_request()?;

    let (items, total) = state
        .store
        .list_orders(query.delivery_status, window)
        .await?;

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items },
        Some(Meta::new(page, per_page, total as i64)),
    ))
}

pub async fn revenue_summary(
    state: &AppState,
    identity: &Identity,
    query: RevenueQuery,
) -> AppResult<ApiResponse<RevenueSummary>> {
    ensure_admin(identity)?;

    let since = match query.days {
        Some(days) if days <= 0 => {
            return Err(AppError::BadRequest("days must be a positive number".into()));
        }
        Some(days) => Some(
            Duration::try_days(days)
                .and_then(|window| Utc::now().checked_sub_signed(window))
                .ok_or_else(|| AppError::BadRequest("days is out of range".into()))?,
        ),
        None => None,
    };

    let (orders, revenue) = state.store.revenue_since(since).await?;

    Ok(ApiResponse::success(
        "Revenue summary",
        RevenueSummary {
            orders,
            revenue,
            since,
        },
        Some(Meta::empty()),
    ))
}
