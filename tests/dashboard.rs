mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use storefront_api::{
    dto::{
        auth::RegisterRequest,
        dashboard::CountedModel,
        newsletter::NewsletterRequest,
        orders::{CreateOrderRequest, OrderCustomerInput},
    },
    error::AppError,
    middleware::auth::Identity,
    models::PaymentStatus,
    notifications::ContactList,
    services::{auth_service, cart_service, dashboard_service, newsletter_service, order_service},
    state::AppState,
};

use common::{ADMIN_ID, add_request, insert_product, product, state};

fn admin() -> Identity {
    Identity::Admin(ADMIN_ID.into())
}

async fn place_order(state: &AppState, name: &str) -> anyhow::Result<String> {
    let item = product(name, 5);
    insert_product(state, &item).await;
    let cart_id = cart_service::add_item(state, &Identity::Guest, add_request(None, &item, None))
        .await?
        .data
        .expect("cart")
        .id;
    let order_id = order_service::create_order(
        state,
        CreateOrderRequest {
            cart_id: Some(cart_id),
            customer: OrderCustomerInput {
                name: "Dana Buyer".into(),
                email: "dana@example.com".into(),
                phone_number: None,
                address: None,
            },
            applied_coupon: None,
            coupon_discount: None,
            payment_method: "cod".into(),
            payment_status: PaymentStatus::Paid,
            mrp: 999.0,
            taxes: 12.0,
            total_amount: 811.0,
            shipping_fees: "free".into(),
            expected_delivery: "3-5 days".into(),
        },
    )
    .await?
    .data
    .expect("order")
    .id;
    Ok(order_id)
}

#[tokio::test]
async fn sold_products_cover_recent_orders() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let first = place_order(&state, "Tee").await?;
    let second = place_order(&state, "Mug").await?;

    let sold = dashboard_service::sold_products(&state, &admin())
        .await?
        .data
        .expect("sold");
    let ids: Vec<_> = sold.items.iter().map(|s| s.order_id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.as_str()) && ids.contains(&second.as_str()));
    assert!(sold.items.iter().all(|s| s.products.len() == 1));
    assert!(sold.items.iter().all(|s| s.created_at >= sold.since));

    let err = dashboard_service::sold_products(&state, &Identity::Guest)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    Ok(())
}

#[tokio::test]
async fn collections_are_counted() -> anyhow::Result<()> {
    let (state, _rx) = state();
    place_order(&state, "Tee").await?;
    insert_product(&state, &product("Cap", 1)).await;
    auth_service::register(
        &state,
        RegisterRequest {
            email: "rey@example.com".into(),
            password: "hunter22".into(),
            first_name: None,
            last_name: None,
        },
    )
    .await?;

    for (model, expected) in [
        (CountedModel::Products, 2),
        (CountedModel::Orders, 1),
        (CountedModel::Customers, 1),
    ] {
        let resp = dashboard_service::count(&state, &admin(), model).await?;
        assert_eq!(resp.message, "Fetched total count of collection successfully");
        assert_eq!(resp.data.expect("count").count, expected);
    }

    let customer = Identity::Customer("a1a1a1a1a1a1a1a1a1a1a1a1".into());
    let err = dashboard_service::count(&state, &customer, CountedModel::Orders)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    Ok(())
}

#[derive(Default)]
struct RecordingList {
    emails: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl ContactList for RecordingList {
    async fn subscribe(&self, email: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("duplicate contact");
        }
        self.emails.lock().unwrap().push(email.to_string());
        Ok(())
    }
}

fn signup(email: &str) -> NewsletterRequest {
    NewsletterRequest {
        email: email.into(),
    }
}

#[tokio::test]
async fn newsletter_signups_reach_the_contact_list() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let err = newsletter_service::subscribe(&state, signup("dana@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Newsletter is not configured");

    let list = Arc::new(RecordingList::default());
    let state = state.with_newsletter(list.clone());

    let err = newsletter_service::subscribe(&state, signup("not-an-email"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid email");

    let resp = newsletter_service::subscribe(&state, signup(" Dana@Example.com ")).await?;
    assert_eq!(resp.message, "Added to newsletter successfully");
    assert_eq!(*list.emails.lock().unwrap(), vec!["dana@example.com"]);
    Ok(())
}

#[tokio::test]
async fn newsletter_provider_failures_are_internal_errors() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let state = state.with_newsletter(Arc::new(RecordingList {
        fail: true,
        ..RecordingList::default()
    }));

    let err = newsletter_service::subscribe(&state, signup("dana@example.com"))
        .await
        .unwrap_err();
    match err {
        AppError::Internal(source) => {
            assert_eq!(source.to_string(), "Adding the email to newsletter failed");
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}
