use std::{sync::Arc, time::Duration as StdDuration};

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;

use crate::{
    models::{CART_RETENTION_DAYS, VERIFICATION_TTL_MINUTES},
    store::{Store, StoreResult},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub carts: u64,
    pub verifications: u64,
}

/// Deletes carts created before the retention window and verification
/// records past their TTL.
pub async fn purge_expired(store: &dyn Store, now: DateTime<Utc>) -> StoreResult<PurgeReport> {
    let carts = store
        .purge_carts_before(now - Duration::days(CART_RETENTION_DAYS))
        .await?;
    let verifications = store
        .purge_verifications_before(now - Duration::minutes(VERIFICATION_TTL_MINUTES))
        .await?;
    Ok(PurgeReport {
        carts,
        verifications,
    })
}

pub fn spawn_purge_task(store: Arc<dyn Store>, every: StdDuration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match purge_expired(store.as_ref(), Utc::now()).await {
                Ok(report) if report.carts + report.verifications > 0 => {
                    tracing::info!(
                        carts = report.carts,
                        verifications = report.verifications,
                        "purged expired documents"
                    );
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "purge failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{LineItem, Verification},
        store::{CartStore, MemoryStore, VerificationStore},
    };

    fn item() -> LineItem {
        LineItem {
            product_id: "p1".into(),
            name: "Tee".into(),
            images: Vec::new(),
            price: 10.0,
            tax: 1.0,
            variant_id: None,
            variant_name: None,
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn only_documents_past_their_window_are_purged() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.upsert_cart_item("owner", item()).await.unwrap();
        store
            .insert_verification(&Verification {
                email: "dana@example.com".into(),
                code: "123456".into(),
                created_at: now - Duration::minutes(20),
            })
            .await
            .unwrap();

        let report = purge_expired(&store, now).await.unwrap();
        assert_eq!(
            report,
            PurgeReport {
                carts: 0,
                verifications: 1
            }
        );

        let later = now + Duration::days(CART_RETENTION_DAYS + 1);
        let report = purge_expired(&store, later).await.unwrap();
        assert_eq!(report.carts, 1);
        assert!(store.find_cart_by_owner("owner").await.unwrap().is_none());
    }
}
