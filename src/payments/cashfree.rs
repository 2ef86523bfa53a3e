use reqwest::Client;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PaymentError, check_status};

const SANDBOX_ORDERS: &str = "https://sandbox.cashfree.com/pg/orders";
const PRODUCTION_ORDERS: &str = "https://api.cashfree.com/pg/orders";
const API_VERSION: &str = "2022-09-01";

#[derive(Debug, Clone)]
pub struct CashfreeClient {
    http: Client,
    client_id: String,
    secret_key: String,
    sandbox: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CashfreeCustomer {
    pub customer_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
}

/// Order creation request. Amounts are in rupees.
#[derive(Debug, Clone)]
pub struct CashfreeOrder {
    pub order_id: String,
    pub amount: f64,
    pub customer: CashfreeCustomer,
    pub return_url: String,
}

impl CashfreeClient {
    pub fn new(client_id: String, secret_key: String, sandbox: bool) -> Self {
        Self {
            http: Client::new(),
            client_id,
            secret_key,
            sandbox,
        }
    }

    fn orders_url(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_ORDERS
        } else {
            PRODUCTION_ORDERS
        }
    }

    /// Returns the gateway payload untouched; the storefront reads the
    /// payment session from it.
    pub async fn create_order(
        &self,
        order: &CashfreeOrder,
    ) -> Result<serde_json::Value, PaymentError> {
        let body = serde_json::json!({
            "order_id": order.order_id,
            "order_amount": order.amount,
            "order_currency": "INR",
            "customer_details": order.customer,
            "order_meta": { "return_url": order.return_url },
        });

        let response = self
            .http
            .post(self.orders_url())
            .header("x-client-id", &self.client_id)
            .header("x-client-secret", &self.secret_key)
            .header("x-api-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_selects_base_url() {
        let sandbox = CashfreeClient::new("id".into(), "secret".into(), true);
        let live = CashfreeClient::new("id".into(), "secret".into(), false);
        assert_eq!(sandbox.orders_url(), SANDBOX_ORDERS);
        assert_eq!(live.orders_url(), PRODUCTION_ORDERS);
    }
}
