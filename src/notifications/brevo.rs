use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use super::{ContactList, Notification, NotificationSender};
use crate::config::AppConfig;

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";
const BREVO_CONTACTS_URL: &str = "https://api.brevo.com/v3/contacts";

/// Sends transactional email through the Brevo (Sendinblue) HTTP API.
#[derive(Debug, Clone)]
pub struct BrevoSender {
    http: Client,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl BrevoSender {
    pub fn new(api_key: String, sender_email: String, sender_name: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            sender_email,
            sender_name,
        }
    }

    /// Brevo when an API key is configured, otherwise a sender that only logs.
    pub fn from_config(config: &AppConfig) -> Arc<dyn NotificationSender> {
        match &config.notifications.brevo_api_key {
            Some(key) => Arc::new(Self::new(
                key.clone(),
                config.notifications.sender_email.clone(),
                config.store.site_name.clone(),
            )),
            None => {
                tracing::warn!("BREVO_API_KEY is not set, emails will only be logged");
                Arc::new(LogSender)
            }
        }
    }
}

#[async_trait]
impl NotificationSender for BrevoSender {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "sender": { "email": self.sender_email, "name": self.sender_name },
            "to": [{ "email": notification.recipient }],
            "subject": notification.template.subject(),
            "templateId": notification.template.template_id(),
            "params": notification.params,
        });

        let response = self
            .http
            .post(BREVO_SEND_URL)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("brevo request failed with status {status}: {text}");
        }

        Ok(())
    }
}

/// Adds contacts to a Brevo list.
#[derive(Debug, Clone)]
pub struct BrevoContacts {
    http: Client,
    api_key: String,
    list_id: i64,
}

impl BrevoContacts {
    pub fn new(api_key: String, list_id: i64) -> Self {
        Self {
            http: Client::new(),
            api_key,
            list_id,
        }
    }

    /// `None` without an API key; signups are then refused.
    pub fn from_config(config: &AppConfig) -> Option<Arc<dyn ContactList>> {
        let key = config.notifications.brevo_api_key.clone()?;
        Some(Arc::new(Self::new(key, config.notifications.newsletter_list_id)))
    }
}

#[async_trait]
impl ContactList for BrevoContacts {
    async fn subscribe(&self, email: &str) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "email": email,
            "listIds": [self.list_id],
        });

        let response = self
            .http
            .post(BREVO_CONTACTS_URL)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("brevo contact request failed with status {status}: {text}");
        }

        let created: serde_json::Value = response.json().await?;
        if created.get("id").is_none() {
            anyhow::bail!("brevo returned no contact id");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        tracing::info!(
            template = ?notification.template,
            recipient = %notification.recipient,
            params = %notification.params,
            "email (not sent)"
        );
        Ok(())
    }
}
