mod common;

use storefront_api::{
    dto::cart::{ChangeQuantityRequest, QuantityAction, RemoveItemRequest},
    error::AppError,
    ids::is_guest_id,
    middleware::auth::Identity,
    services::cart_service,
};

use common::{add_request, insert_product, product, state, variant};

fn change(cart_id: &str, product_id: &str, action: QuantityAction) -> ChangeQuantityRequest {
    ChangeQuantityRequest {
        cart_id: Some(cart_id.to_string()),
        product_id: product_id.to_string(),
        variant_id: None,
        action,
    }
}

#[tokio::test]
async fn guest_cart_increments_stop_at_live_stock() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let tee = product("Tee", 5);
    insert_product(&state, &tee).await;

    let created =
        cart_service::add_item(&state, &Identity::Guest, add_request(None, &tee, None)).await?;
    assert_eq!(created.message, "Successfully created the cart");
    let cart_id = created.data.expect("cart").id;

    let owner = state.store.find_cart(&cart_id).await?.expect("stored cart").owner_id;
    assert!(is_guest_id(&owner));

    for _ in 0..4 {
        cart_service::change_quantity(&state, change(&cart_id, &tee.id, QuantityAction::Increment))
            .await?;
    }
    let cart = state.store.find_cart(&cart_id).await?.expect("cart");
    assert_eq!(cart.products[0].quantity, 5);

    let increment = change(&cart_id, &tee.id, QuantityAction::Increment);
    let err = cart_service::change_quantity(&state, increment)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { available: 5 }));
    assert_eq!(err.to_string(), "Only 5 items available");

    let cart = state.store.find_cart(&cart_id).await?.expect("cart");
    assert_eq!(cart.products[0].quantity, 5);
    Ok(())
}

#[tokio::test]
async fn adding_the_same_item_twice_merges_quantity() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let tee = product("Tee", 10);
    insert_product(&state, &tee).await;

    let first =
        cart_service::add_item(&state, &Identity::Guest, add_request(None, &tee, None)).await?;
    let cart_id = first.data.expect("cart").id;

    let again = add_request(Some(&cart_id), &tee, None);
    let second = cart_service::add_item(&state, &Identity::Guest, again).await?;
    assert_eq!(second.message, "Successfully updated the cart");

    let cart = second.data.expect("cart");
    assert_eq!(cart.id, cart_id);
    assert_eq!(cart.products.len(), 1);
    assert_eq!(cart.products[0].quantity, 2);
    Ok(())
}

#[tokio::test]
async fn variants_are_separate_line_items() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let mut hoodie = product("Hoodie", 10);
    let small = variant("S", Some(3));
    hoodie.variants.push(small.clone());
    insert_product(&state, &hoodie).await;

    let cart_id = cart_service::add_item(&state, &Identity::Guest, add_request(None, &hoodie, None))
        .await?
        .data
        .expect("cart")
        .id;
    let cart = cart_service::add_item(
        &state,
        &Identity::Guest,
        add_request(Some(&cart_id), &hoodie, Some(&small.id)),
    )
    .await?
    .data
    .expect("cart");

    assert_eq!(cart.products.len(), 2);
    assert!(cart.products.iter().all(|item| item.quantity == 1));
    Ok(())
}

#[tokio::test]
async fn variant_increments_check_variant_stock() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let mut hoodie = product("Hoodie", 50);
    let small = variant("S", Some(1));
    hoodie.variants.push(small.clone());
    insert_product(&state, &hoodie).await;

    let cart_id = cart_service::add_item(
        &state,
        &Identity::Guest,
        add_request(None, &hoodie, Some(&small.id)),
    )
    .await?
    .data
    .expect("cart")
    .id;

    let err = cart_service::change_quantity(
        &state,
        ChangeQuantityRequest {
            cart_id: Some(cart_id),
            product_id: hoodie.id.clone(),
            variant_id: Some(small.id.clone()),
            action: QuantityAction::Increment,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Only 1 items available");
    Ok(())
}

#[tokio::test]
async fn decrement_never_drops_below_one() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let tee = product("Tee", 5);
    insert_product(&state, &tee).await;

    let cart_id = cart_service::add_item(&state, &Identity::Guest, add_request(None, &tee, None))
        .await?
        .data
        .expect("cart")
        .id;

    let resp =
        cart_service::change_quantity(&state, change(&cart_id, &tee.id, QuantityAction::Decrement))
            .await?;
    assert_eq!(resp.message, "Successfully updated the quantity");
    assert_eq!(resp.data.expect("cart").products[0].quantity, 1);
    Ok(())
}

#[tokio::test]
async fn quantity_changes_report_missing_pieces() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let tee = product("Tee", 5);
    let mug = product("Mug", 5);
    insert_product(&state, &tee).await;

    let increment = change("nope", &tee.id, QuantityAction::Increment);
    let err = cart_service::change_quantity(&state, increment)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m == "Cart not found"));

    let cart_id = cart_service::add_item(&state, &Identity::Guest, add_request(None, &tee, None))
        .await?
        .data
        .expect("cart")
        .id;

    let increment = change(&cart_id, &mug.id, QuantityAction::Increment);
    let err = cart_service::change_quantity(&state, increment)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Item not available in cart");

    state.store.delete_product(&tee.id).await?;
    let increment = change(&cart_id, &tee.id, QuantityAction::Increment);
    let err = cart_service::change_quantity(&state, increment)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Product stock information not found");
    Ok(())
}

#[tokio::test]
async fn remove_item_drops_the_line() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let tee = product("Tee", 5);
    insert_product(&state, &tee).await;

    let cart_id = cart_service::add_item(&state, &Identity::Guest, add_request(None, &tee, None))
        .await?
        .data
        .expect("cart")
        .id;

    let request = || RemoveItemRequest {
        cart_id: Some(cart_id.clone()),
        product_id: tee.id.clone(),
        variant_id: None,
    };

    let resp = cart_service::remove_item(&state, request()).await?;
    assert_eq!(resp.message, "Product removed from cart successfully");
    assert!(resp.data.expect("cart").products.is_empty());

    let err = cart_service::remove_item(&state, request()).await.unwrap_err();
    assert_eq!(err.to_string(), "Item not found in cart");
    Ok(())
}

#[tokio::test]
async fn customers_only_see_their_own_cart() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let tee = product("Tee", 5);
    insert_product(&state, &tee).await;

    let alice = Identity::Customer("a1a1a1a1a1a1a1a1a1a1a1a1".into());
    let bob = Identity::Customer("b2b2b2b2b2b2b2b2b2b2b2b2".into());

    let cart_id = cart_service::add_item(&state, &alice, add_request(None, &tee, None))
        .await?
        .data
        .expect("cart")
        .id;

    let resp = cart_service::get_cart(&state, &alice, Some(&cart_id)).await?;
    assert_eq!(resp.message, "Cart retrieved successfully");

    for outsider in [bob, Identity::Guest, Identity::Admin(common::ADMIN_ID.into())] {
        let err = cart_service::get_cart(&state, &outsider, Some(&cart_id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
    Ok(())
}

#[tokio::test]
async fn guest_carts_are_readable_by_anyone_holding_the_id() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let tee = product("Tee", 5);
    insert_product(&state, &tee).await;

    let cart_id = cart_service::add_item(&state, &Identity::Guest, add_request(None, &tee, None))
        .await?
        .data
        .expect("cart")
        .id;

    assert!(cart_service::get_cart(&state, &Identity::Guest, Some(&cart_id)).await.is_ok());

    let customer = Identity::Customer("c3c3c3c3c3c3c3c3c3c3c3c3".into());
    assert!(cart_service::get_cart(&state, &customer, Some(&cart_id)).await.is_err());
    assert!(cart_service::get_cart(&state, &Identity::Guest, None).await.is_err());
    Ok(())
}
