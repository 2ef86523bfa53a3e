use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payments::{
        CashfreeOrderRequest, RazorpayCheckout, RazorpayOrderRequest, StripeIntentRequest,
    },
    error::AppResult,
    payments::PaymentIntent,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stripe", post(stripe))
        .route("/razorpay", post(razorpay))
        .route("/cashfree", post(cashfree))
}

#[utoipa::path(
    post,
    path = "/api/payments/stripe",
    request_body = StripeIntentRequest,
    responses(
        (
            status = 200,
            description = "Payment intent created or re-priced",
            body = ApiResponse<PaymentIntent>
        ),
        (status = 503, description = "Stripe is not configured"),
    ),
    tag = "Payments"
)]
pub async fn stripe(
    State(state): State<AppState>,
    Json(payload): Json<StripeIntentRequest>,
) -> AppResult<Json<ApiResponse<PaymentIntent>>> {
    let resp = payment_service::stripe_intent(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/razorpay",
    request_body = RazorpayOrderRequest,
    responses(
        (status = 200, description = "Gateway order created", body = ApiResponse<RazorpayCheckout>),
        (status = 503, description = "Razorpay is not configured"),
    ),
    tag = "Payments"
)]
pub async fn razorpay(
    State(state): State<AppState>,
    Json(payload): Json<RazorpayOrderRequest>,
) -> AppResult<Json<ApiResponse<RazorpayCheckout>>> {
    let resp = payment_service::razorpay_order(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/cashfree",
    request_body = CashfreeOrderRequest,
    responses(
        (
            status = 200,
            description = "Gateway payload with the payment session",
            body = ApiResponse<serde_json::Value>
        ),
        (status = 503, description = "Cashfree is not configured"),
    ),
    tag = "Payments"
)]
pub async fn cashfree(
    State(state): State<AppState>,
    Json(payload): Json<CashfreeOrderRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = payment_service::cashfree_order(&state, payload).await?;
    Ok(Json(resp))
}
