use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Address, DeliveryStatus, Order, PaymentStatus};

/// Contact details captured with the order. The customer id is taken from
/// the cart owner, never from the client.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderCustomerInput {
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Falls back to the `cart_id` cookie when omitted.
    pub cart_id: Option<String>,
    pub customer: OrderCustomerInput,
    pub applied_coupon: Option<String>,
    pub coupon_discount: Option<i64>,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub mrp: f64,
    pub taxes: f64,
    pub total_amount: f64,
    pub shipping_fees: String,
    pub expected_delivery: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedOrder {
    pub id: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EditOrderRequest {
    pub payment_status: Option<PaymentStatus>,
    pub delivery_status: Option<DeliveryStatus>,
    pub tracking_link: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueSummary {
    pub orders: u64,
    pub revenue: f64,
    /// Start of the window; absent for all-time figures.
    pub since: Option<DateTime<Utc>>,
}
