mod common;

use std::sync::Arc;

use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        auth::{LoginRequest, RegisterRequest},
        orders::{CreateOrderRequest, EditOrderRequest, OrderCustomerInput},
    },
    ids::new_document_id,
    middleware::auth::Identity,
    models::{DeliveryStatus, PaymentStatus},
    notifications::Outbox,
    payments::PaymentGateways,
    services::{auth_service, cart_service, order_service},
    state::AppState,
    store::PgStore,
};

use common::{ADMIN_ID, add_request, drain, product, variant};

// Guest cart -> order -> admin edit, then a customer login that picks up its cart.
#[tokio::test]
async fn cart_to_order_against_postgres() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run flow tests.");
            return Ok(());
        }
    };

    let conn = create_orm_conn(&database_url).await?;
    run_migrations(&conn).await?;
    let (outbox, mut rx) = Outbox::channel();
    let config = AppConfig::for_tests();
    let payments = PaymentGateways::from_config(&config);
    let state = AppState::new(config, Arc::new(PgStore::new(conn)), outbox, payments);

    let mut hoodie = product(&format!("Hoodie {}", new_document_id()), 10);
    let medium = variant("M", Some(4));
    hoodie.variants.push(medium.clone());
    state.store.insert_product(&hoodie).await?;

    let cart_id = cart_service::add_item(&state, &Identity::Guest, add_request(None, &hoodie, None))
        .await?
        .data
        .expect("cart")
        .id;
    for variant_id in [Some(medium.id.as_str()), Some(medium.id.as_str()), None] {
        cart_service::add_item(
            &state,
            &Identity::Guest,
            add_request(Some(&cart_id), &hoodie, variant_id),
        )
        .await?;
    }
    let cart = state.store.find_cart(&cart_id).await?.expect("cart");
    assert_eq!(cart.products.len(), 2);

    let order_id = order_service::create_order(
        &state,
        CreateOrderRequest {
            cart_id: Some(cart_id.clone()),
            customer: OrderCustomerInput {
                name: "Dana Buyer".into(),
                email: "dana@example.com".into(),
                phone_number: None,
                address: None,
            },
            applied_coupon: None,
            coupon_discount: None,
            payment_method: "cod".into(),
            payment_status: PaymentStatus::Pending,
            mrp: 3996.0,
            taxes: 48.0,
            total_amount: 3396.0,
            shipping_fees: "free".into(),
            expected_delivery: "3-5 days".into(),
        },
    )
    .await?
    .data
    .expect("order")
    .id;

    assert!(state.store.find_cart(&cart_id).await?.is_none());
    let stored = state.store.find_product(&hoodie.id).await?.expect("product");
    assert_eq!(stored.stock, 8);
    assert_eq!(stored.variant(&medium.id).and_then(|v| v.stock), Some(2));
    assert_eq!(drain(&mut rx).len(), 2);

    let edited = order_service::edit_order(
        &state,
        &Identity::Admin(ADMIN_ID.into()),
        &order_id,
        EditOrderRequest {
            delivery_status: Some(DeliveryStatus::Shipped),
            ..EditOrderRequest::default()
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(edited.delivery_status, DeliveryStatus::Shipped);

    let email = format!("{}@example.com", new_document_id());
    let customer_id = auth_service::register(
        &state,
        RegisterRequest {
            email: email.clone(),
            password: "hunter22".into(),
            first_name: None,
            last_name: None,
        },
    )
    .await?
    .data
    .expect("customer")
    .id;
    let owned_cart = cart_service::add_item(
        &state,
        &Identity::Customer(customer_id),
        add_request(None, &hoodie, None),
    )
    .await?
    .data
    .expect("cart")
    .id;

    let login = auth_service::login(
        &state,
        LoginRequest {
            email,
            password: "hunter22".into(),
        },
    )
    .await?
    .data
    .expect("login");
    assert_eq!(login.cart_id.as_deref(), Some(owned_cart.as_str()));

    state.store.delete_product(&hoodie.id).await?;
    Ok(())
}
