//! Transactional email outbox.
//!
//! Workflows enqueue [`Notification`] intents and return immediately. A
//! background worker drains the queue and hands each intent to a
//! [`NotificationSender`]. Delivery failures are logged and dropped.
//!
//! Newsletter signups go straight to the provider through a [`ContactList`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::{sync::mpsc, task::JoinHandle};

mod brevo;

pub use brevo::{BrevoContacts, BrevoSender, LogSender};

use crate::models::{Order, OrderCustomer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmailTemplate {
    VerificationCode,
    PasswordChanged,
    OrderConfirmation,
    NewOrderAlert,
    OrderShipped,
    OrderDelivered,
}

impl EmailTemplate {
    /// Template id registered with the email provider.
    pub fn template_id(&self) -> i64 {
        match self {
            EmailTemplate::VerificationCode => 8,
            EmailTemplate::PasswordChanged => 9,
            EmailTemplate::OrderConfirmation => 10,
            EmailTemplate::NewOrderAlert => 11,
            EmailTemplate::OrderShipped => 12,
            EmailTemplate::OrderDelivered => 13,
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            EmailTemplate::VerificationCode => "Your Verification Code is Here!",
            EmailTemplate::PasswordChanged => "Your password has been changed",
            EmailTemplate::OrderConfirmation => "Thank you for your order!",
            EmailTemplate::NewOrderAlert => "New order received",
            EmailTemplate::OrderShipped => "Your order is on its way!",
            EmailTemplate::OrderDelivered => "Your order has been delivered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub template: EmailTemplate,
    pub recipient: String,
    pub params: serde_json::Value,
}

impl Notification {
    pub fn verification_code(email: &str, code: &str) -> Self {
        Self {
            template: EmailTemplate::VerificationCode,
            recipient: email.to_string(),
            params: serde_json::json!({ "verificationCode": code }),
        }
    }

    pub fn password_changed(email: &str) -> Self {
        Self {
            template: EmailTemplate::PasswordChanged,
            recipient: email.to_string(),
            params: serde_json::json!({ "email": email }),
        }
    }

    /// Order-scoped email addressed to the customer on the order, or to
    /// `recipient` when given (store alerts).
    pub fn for_order(template: EmailTemplate, order: &Order, recipient: Option<&str>) -> Self {
        let OrderCustomer { name, email, .. } = &order.customer;
        Self {
            template,
            recipient: recipient.unwrap_or(email.as_str()).to_string(),
            params: serde_json::json!({
                "orderId": order.id,
                "customerName": name,
                "customerEmail": email,
                "products": order.products,
                "mrp": order.mrp,
                "taxes": order.taxes,
                "totalAmount": order.total_amount,
                "shippingFees": order.shipping_fees,
                "expectedDelivery": order.expected_delivery,
                "paymentMethod": order.payment_method,
                "trackingLink": order.tracking_link,
            }),
        }
    }
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Marketing contact list kept by the email provider.
#[async_trait]
pub trait ContactList: Send + Sync {
    async fn subscribe(&self, email: &str) -> anyhow::Result<()>;
}

/// Producer half of the notification queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Outbox {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Never fails the caller. A closed queue only produces a warning.
    pub fn enqueue(&self, notification: Notification) {
        let template = notification.template;
        if self.tx.send(notification).is_err() {
            tracing::warn!(?template, "notification queue closed, dropping email");
        }
    }
}

/// Delivers queued notifications until every [`Outbox`] handle is dropped.
pub async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    sender: Arc<dyn NotificationSender>,
    max_attempts: u32,
) {
    while let Some(notification) = rx.recv().await {
        deliver(sender.as_ref(), &notification, max_attempts).await;
    }
    tracing::debug!("notification worker stopped");
}

pub fn spawn_worker(
    rx: mpsc::UnboundedReceiver<Notification>,
    sender: Arc<dyn NotificationSender>,
    max_attempts: u32,
) -> JoinHandle<()> {
    tokio::spawn(run_worker(rx, sender, max_attempts))
}

async fn deliver(sender: &dyn NotificationSender, notification: &Notification, max_attempts: u32) {
    let attempts = max_attempts.max(1);
    for attempt in 1..=attempts {
        match sender.send(notification).await {
            Ok(()) => {
                tracing::debug!(
                    template = ?notification.template,
                    recipient = %notification.recipient,
                    "email sent"
                );
                return;
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    attempt,
                    template = ?notification.template,
                    recipient = %notification.recipient,
                    "email delivery failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    struct Flaky {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl NotificationSender for Flaky {
        async fn send(&self, _notification: &Notification) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                anyhow::bail!("provider unavailable");
            }
            Ok(())
        }
    }

    fn flaky(failures: u32) -> Arc<Flaky> {
        Arc::new(Flaky {
            failures_left: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
        })
    }

    #[tokio::test]
    async fn single_attempt_by_default_drops_failures() {
        let sender = flaky(1);
        let (outbox, rx) = Outbox::channel();
        outbox.enqueue(Notification::password_changed("a@example.com"));
        outbox.enqueue(Notification::password_changed("b@example.com"));
        drop(outbox);

        run_worker(rx, sender.clone(), 1).await;
        assert_eq!(sender.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retries_up_to_max_attempts() {
        let sender = flaky(2);
        let (outbox, rx) = Outbox::channel();
        outbox.enqueue(Notification::verification_code("a@example.com", "123456"));
        drop(outbox);

        run_worker(rx, sender.clone(), 3).await;
        assert_eq!(sender.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn enqueue_on_closed_queue_does_not_panic() {
        let (outbox, rx) = Outbox::channel();
        drop(rx);
        outbox.enqueue(Notification::password_changed("a@example.com"));
    }
}
