#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::Utc;
use storefront_api::{
    config::AppConfig,
    dto::cart::AddItemRequest,
    ids::new_document_id,
    models::{Product, ProductType, VariantCombination},
    notifications::Notification,
    state::AppState,
};
use tokio::sync::mpsc::UnboundedReceiver;

pub const ADMIN_ID: &str = "aaaaaaaaaaaaaaaaaaaaaaaa";

pub fn state() -> (AppState, UnboundedReceiver<Notification>) {
    AppState::in_memory(AppConfig::for_tests())
}

pub fn product(name: &str, stock: i64) -> Product {
    let now = Utc::now();
    Product {
        id: new_document_id(),
        name: name.to_string(),
        description: format!("{name} description"),
        category: "apparel".into(),
        product_type: ProductType::Simple,
        images: vec![format!("https://cdn.example.com/{name}.png")],
        regular_price: 999.0,
        sale_price: 799.0,
        tax: 12.0,
        stock,
        variants: Vec::new(),
        trending: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn variant(size: &str, stock: Option<i64>) -> VariantCombination {
    VariantCombination {
        id: new_document_id(),
        attributes: BTreeMap::from([("Size".to_string(), size.to_string())]),
        images: Vec::new(),
        regular_price: Some(999.0),
        sale_price: Some(899.0),
        tax: None,
        stock,
    }
}

pub async fn insert_product(state: &AppState, product: &Product) {
    state
        .store
        .insert_product(product)
        .await
        .expect("insert product");
}

pub fn add_request(
    cart_id: Option<&str>,
    product: &Product,
    variant_id: Option<&str>,
) -> AddItemRequest {
    AddItemRequest {
        cart_id: cart_id.map(str::to_string),
        product_id: product.id.clone(),
        name: product.name.clone(),
        images: product.images.clone(),
        price: product.sale_price,
        tax: product.tax,
        variant_id: variant_id.map(str::to_string),
        variant_name: None,
    }
}

/// Everything enqueued so far, without waiting.
pub fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        out.push(notification);
    }
    out
}
