use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    config::AppConfig,
    notifications::{BrevoContacts, ContactList, Notification, Outbox},
    payments::PaymentGateways,
    store::{MemoryStore, Store},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub outbox: Outbox,
    pub payments: Arc<PaymentGateways>,
    /// Newsletter provider, absent when email is not configured.
    pub newsletter: Option<Arc<dyn ContactList>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        outbox: Outbox,
        payments: PaymentGateways,
    ) -> Self {
        Self {
            newsletter: BrevoContacts::from_config(&config),
            config: Arc::new(config),
            store,
            outbox,
            payments: Arc::new(payments),
        }
    }

    pub fn with_newsletter(mut self, contacts: Arc<dyn ContactList>) -> Self {
        self.newsletter = Some(contacts);
        self
    }

    /// State over an empty in-process store. The receiver yields every
    /// notification the services enqueue.
    pub fn in_memory(config: AppConfig) -> (Self, UnboundedReceiver<Notification>) {
        let (outbox, rx) = Outbox::channel();
        let payments = PaymentGateways::from_config(&config);
        let state = Self::new(config, Arc::new(MemoryStore::new()), outbox, payments);
        (state, rx)
    }
}
