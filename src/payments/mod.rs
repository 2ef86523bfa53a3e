//! Payment gateway clients. Each call is a single HTTP attempt; gateways
//! without credentials are simply absent.

use thiserror::Error;

use crate::config::AppConfig;

mod cashfree;
mod razorpay;
mod stripe;

pub use cashfree::{CashfreeClient, CashfreeCustomer, CashfreeOrder};
pub use razorpay::{RazorpayClient, RazorpayOrder};
pub use stripe::{PaymentIntent, StripeClient, StripeShipping};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway responded with {status}: {body}")]
    Gateway { status: u16, body: String },
}

/// Converts an amount in major units (rupees) to minor units (paise).
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PaymentError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(PaymentError::Gateway { status, body })
}

#[derive(Debug, Clone, Default)]
pub struct PaymentGateways {
    pub stripe: Option<StripeClient>,
    pub razorpay: Option<RazorpayClient>,
    pub cashfree: Option<CashfreeClient>,
}

impl PaymentGateways {
    pub fn from_config(config: &AppConfig) -> Self {
        let payments = &config.payments;

        let stripe = payments.stripe_secret_key.clone().map(StripeClient::new);

        let razorpay = match (&payments.razorpay_key_id, &payments.razorpay_key_secret) {
            (Some(id), Some(secret)) => Some(RazorpayClient::new(id.clone(), secret.clone())),
            _ => None,
        };

        let cashfree = match (&payments.cashfree_client_id, &payments.cashfree_secret_key) {
            (Some(id), Some(secret)) => Some(CashfreeClient::new(
                id.clone(),
                secret.clone(),
                payments.cashfree_sandbox,
            )),
            _ => None,
        };

        for (name, configured) in [
            ("stripe", stripe.is_some()),
            ("razorpay", razorpay.is_some()),
            ("cashfree", cashfree.is_some()),
        ] {
            if !configured {
                tracing::info!(gateway = name, "payment gateway disabled, credentials missing");
            }
        }

        Self {
            stripe,
            razorpay,
            cashfree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_round_to_nearest_paisa() {
        assert_eq!(to_minor_units(499.0), 49900);
        assert_eq!(to_minor_units(19.99), 1999);
    }

    #[test]
    fn gateways_need_complete_credentials() {
        let mut config = AppConfig::for_tests();
        config.payments.razorpay_key_id = Some("rzp_test".into());
        config.payments.stripe_secret_key = Some("sk_test".into());

        let gateways = PaymentGateways::from_config(&config);
        assert!(gateways.stripe.is_some());
        assert!(gateways.razorpay.is_none());
        assert!(gateways.cashfree.is_none());
    }
}
