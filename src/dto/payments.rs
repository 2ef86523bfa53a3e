use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::payments::{CashfreeCustomer, RazorpayOrder, StripeShipping};

/// Creates a payment intent, or re-prices `payment_intent_id` when given.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StripeIntentRequest {
    pub amount: f64,
    pub shipping: StripeShipping,
    pub payment_intent_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RazorpayOrderRequest {
    pub amount: f64,
    pub receipt: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RazorpayCheckout {
    pub key_id: String,
    pub order: RazorpayOrder,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CashfreeOrderRequest {
    pub order_id: Option<String>,
    pub amount: f64,
    pub customer: CashfreeCustomer,
}
