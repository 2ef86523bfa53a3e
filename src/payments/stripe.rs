use reqwest::Client;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PaymentError, check_status, to_minor_units};
use crate::models::Address;

const STRIPE_API: &str = "https://api.stripe.com/v1/payment_intents";

#[derive(Debug, Clone)]
pub struct StripeClient {
    http: Client,
    secret_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct StripeShipping {
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            http: Client::new(),
            secret_key,
        }
    }

    pub async fn create_intent(
        &self,
        amount: f64,
        shipping: &StripeShipping,
    ) -> Result<PaymentIntent, PaymentError> {
        let address = &shipping.address;
        let mut form = vec![
            ("amount", to_minor_units(amount).to_string()),
            ("currency", "inr".to_string()),
            ("shipping[name]", shipping.name.clone()),
            ("shipping[address][line1]", address.address1.clone()),
            ("shipping[address][city]", address.city.clone()),
            ("shipping[address][state]", address.state.clone()),
            ("shipping[address][postal_code]", address.postal_code.clone()),
            (
                "shipping[address][country]",
                address.country.clone().unwrap_or_else(|| "IN".to_string()),
            ),
        ];
        if let Some(line2) = &address.address2 {
            form.push(("shipping[address][line2]", line2.clone()));
        }

        let response = self
            .http
            .post(STRIPE_API)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    pub async fn update_amount(
        &self,
        intent_id: &str,
        amount: f64,
    ) -> Result<PaymentIntent, PaymentError> {
        let response = self
            .http
            .post(format!("{STRIPE_API}/{intent_id}"))
            .bearer_auth(&self.secret_key)
            .form(&[("amount", to_minor_units(amount).to_string())])
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}
