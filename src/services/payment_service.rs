use crate::{
    dto::payments::{
        CashfreeOrderRequest, RazorpayCheckout, RazorpayOrderRequest, StripeIntentRequest,
    },
    error::{AppError, AppResult},
    ids::new_document_id,
    payments::{CashfreeOrder, PaymentIntent},
    response::{ApiResponse, Meta},
    state::AppState,
};

fn ensure_positive(amount: f64) -> AppResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::BadRequest(
            "Amount must be greater than zero".into(),
        ));
    }
    Ok(())
}

pub async fn stripe_intent(
    state: &AppState,
    payload: StripeIntentRequest,
) -> AppResult<ApiResponse<PaymentIntent>> {
    ensure_positive(payload.amount)?;
    let stripe = state
        .payments
        .stripe
        .as_ref()
        .ok_or(AppError::Unavailable("Stripe"))?;

    let (intent, message) = match payload.payment_intent_id.as_deref() {
        Some(intent_id) if !intent_id.is_empty() => (
            stripe.update_amount(intent_id, payload.amount).await?,
            "Payment intent updated",
        ),
        _ => (
            stripe.create_intent(payload.amount, &payload.shipping).await?,
            "Payment intent created",
        ),
    };

    tracing::info!(intent_id = %intent.id, amount = payload.amount, "stripe intent ready");
    Ok(ApiResponse::success(message, intent, Some(Meta::empty())))
}

pub async fn razorpay_order(
    state: &AppState,
    payload: RazorpayOrderRequest,
) -> AppResult<ApiResponse<RazorpayCheckout>> {
    ensure_positive(payload.amount)?;
    let razorpay = state
        .payments
        .razorpay
        .as_ref()
        .ok_or(AppError::Unavailable("Razorpay"))?;

    let receipt = payload
        .receipt
        .filter(|r| !r.is_empty())
        .unwrap_or_else(new_document_id);
    let order = razorpay.create_order(payload.amount, &receipt).await?;

    tracing::info!(gateway_order_id = %order.id, receipt, "razorpay order created");
    Ok(ApiResponse::success(
        "Razorpay order created",
        RazorpayCheckout {
            key_id: razorpay.key_id().to_string(),
            order,
        },
        Some(Meta::empty()),
    ))
}

pub fn cashfree_return_url(client_url: &str, order_id: &str) -> String {
    format!(
        "{}/payment-success?order_id={order_id}",
        client_url.trim_end_matches('/')
    )
}

pub async fn cashfree_order(
    state: &AppState,
    payload: CashfreeOrderRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_positive(payload.amount)?;
    let cashfree = state
        .payments
        .cashfree
        .as_ref()
        .ok_or(AppError::Unavailable("Cashfree"))?;

    let order_id = payload
        .order_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(new_document_id);
    let order = CashfreeOrder {
        return_url: cashfree_return_url(&state.config.store.client_url, &order_id),
        order_id,
        amount: payload.amount,
        customer: payload.customer,
    };
    let session = cashfree.create_order(&order).await?;

    tracing::info!(order_id = %order.order_id, "cashfree order created");
    Ok(ApiResponse::success(
        "Cashfree order created",
        session,
        Some(Meta::empty()),
    ))
}
