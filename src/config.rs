use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub notifications: NotificationConfig,
    pub payments: PaymentConfig,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub cookie_secure: bool,
}

/// Public storefront settings: cookie scope, redirect targets and branding.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub client_url: String,
    pub site_name: String,
    pub admin_email: String,
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub brevo_api_key: Option<String>,
    pub sender_email: String,
    pub max_attempts: u32,
    /// Contact list newsletter signups are added to.
    pub newsletter_list_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentConfig {
    pub stripe_secret_key: Option<String>,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub cashfree_client_id: Option<String>,
    pub cashfree_secret_key: Option<String>,
    pub cashfree_sandbox: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let auth = AuthConfig {
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            token_ttl_days: env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|d| d.parse::<i64>().ok())
                .unwrap_or(15),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v != "false")
                .unwrap_or(true),
        };

        let store = StoreConfig {
            client_url: env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3001".into()),
            site_name: env::var("SITE_NAME").unwrap_or_else(|_| "Storefront".into()),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".into()),
        };

        let notifications = NotificationConfig {
            brevo_api_key: optional("BREVO_API_KEY"),
            sender_email: env::var("BREVO_SENDER_EMAIL")
                .unwrap_or_else(|_| "no-reply@example.com".into()),
            max_attempts: env::var("NOTIFICATION_MAX_ATTEMPTS")
                .ok()
                .and_then(|n| n.parse::<u32>().ok())
                .unwrap_or(1)
                .max(1),
            newsletter_list_id: env::var("BREVO_NEWSLETTER_LIST_ID")
                .ok()
                .and_then(|n| n.parse::<i64>().ok())
                .unwrap_or(2),
        };

        let payments = PaymentConfig {
            stripe_secret_key: optional("STRIPE_SECRET_KEY"),
            razorpay_key_id: optional("RAZORPAY_KEY_ID"),
            razorpay_key_secret: optional("RAZORPAY_KEY_SECRET"),
            cashfree_client_id: optional("CASHFREE_CLIENT_ID"),
            cashfree_secret_key: optional("CASHFREE_SECRET_KEY"),
            cashfree_sandbox: env::var("CASHFREE_ENV")
                .map(|v| v == "sandbox")
                .unwrap_or(true),
        };

        Ok(Self {
            port,
            database_url,
            host,
            auth,
            store,
            notifications,
            payments,
        })
    }

    /// Configuration for tests and local tooling that never touches the network.
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            host: "127.0.0.1".into(),
            port: 0,
            auth: AuthConfig {
                jwt_secret: "test-secret".into(),
                token_ttl_days: 15,
                cookie_secure: true,
            },
            store: StoreConfig {
                client_url: "https://shop.example.com".into(),
                site_name: "Test Store".into(),
                admin_email: "owner@example.com".into(),
            },
            notifications: NotificationConfig {
                brevo_api_key: None,
                sender_email: "no-reply@example.com".into(),
                max_attempts: 1,
                newsletter_list_id: 2,
            },
            payments: PaymentConfig::default(),
        }
    }

    /// Host part of the storefront URL, used as the cookie domain.
    pub fn cookie_domain(&self) -> String {
        let without_scheme = self
            .store
            .client_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.store.client_url);
        let authority = without_scheme.split('/').next().unwrap_or_default();
        authority
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or(authority)
            .to_string()
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_domain_strips_scheme_port_and_path() {
        let mut config = AppConfig::for_tests();
        config.store.client_url = "https://shop.example.com:8443/catalog".into();
        assert_eq!(config.cookie_domain(), "shop.example.com");

        config.store.client_url = "localhost".into();
        assert_eq!(config.cookie_domain(), "localhost");
    }
}
