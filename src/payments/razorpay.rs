use reqwest::Client;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PaymentError, check_status, to_minor_units};

const RAZORPAY_ORDERS: &str = "https://api.razorpay.com/v1/orders";

#[derive(Debug, Clone)]
pub struct RazorpayClient {
    http: Client,
    key_id: String,
    key_secret: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: Option<String>,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self {
            http: Client::new(),
            key_id,
            key_secret,
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub async fn create_order(
        &self,
        amount: f64,
        receipt: &str,
    ) -> Result<RazorpayOrder, PaymentError> {
        let body = serde_json::json!({
            "amount": to_minor_units(amount),
            "currency": "INR",
            "receipt": receipt,
        });

        let response = self
            .http
            .post(RAZORPAY_ORDERS)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}
