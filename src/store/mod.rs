//! Document persistence.
//!
//! Each aggregate gets its own repository trait. Every method touches a single
//! document, and anything that reads and then writes that document does so
//! atomically. Nothing here spans documents: callers compose calls and accept
//! that a later call may fail after an earlier one succeeded.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    Admin, Cart, Customer, CustomerChanges, CustomerStatus, DeliveryStatus, LineItem, Order,
    OrderChanges, Product, ProductSettings, Review, Verification,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("malformed document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("duplicate key: {0}")]
    Duplicate(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn all() -> Self {
        Self {
            offset: 0,
            limit: u64::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceLowToHigh,
    PriceHighToLow,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub categories: Vec<String>,
    /// Inclusive `(min, max)` bounds on the sale price; a product matches if
    /// it falls in any range.
    pub price_ranges: Vec<(f64, f64)>,
    pub trending: bool,
    pub in_stock: bool,
    pub out_of_stock: bool,
    /// Case-insensitive substring over name, description and category.
    pub search: Option<String>,
    pub sort: ProductSort,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&product.category) {
            return false;
        }
        if !self.price_ranges.is_empty()
            && !self
                .price_ranges
                .iter()
                .any(|(min, max)| product.sale_price >= *min && product.sale_price <= *max)
        {
            return false;
        }
        if self.trending && !product.trending {
            return false;
        }
        if self.in_stock && product.stock <= 0 {
            return false;
        }
        if self.out_of_stock && product.stock > 0 {
            return false;
        }
        if let Some(term) = self.search.as_ref().map(|t| t.to_lowercase()) {
            let hit = [&product.name, &product.description, &product.category]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Which stock field a decrement landed on, and what it holds afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
    Variant { remaining: i64 },
    Product { remaining: i64 },
}

impl StockDecrement {
    pub fn remaining(&self) -> i64 {
        match self {
            StockDecrement::Variant { remaining } | StockDecrement::Product { remaining } => {
                *remaining
            }
        }
    }
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_cart(&self, id: &str) -> StoreResult<Option<Cart>>;

    async fn find_cart_by_owner(&self, owner_id: &str) -> StoreResult<Option<Cart>>;

    /// Merges `item` into the cart owned by `owner_id`, creating the cart when
    /// the owner has none.
    async fn upsert_cart_item(&self, owner_id: &str, item: LineItem) -> StoreResult<Cart>;

    /// Replaces the line items of an existing cart. Returns `None` when the
    /// cart no longer exists.
    async fn save_cart(&self, cart: &Cart) -> StoreResult<Option<Cart>>;

    async fn delete_cart(&self, id: &str) -> StoreResult<bool>;

    async fn purge_carts_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Case-insensitive exact name lookup.
    async fn find_product_by_name(&self, name: &str) -> StoreResult<Option<Product>>;

    async fn find_products_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Product>>;

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Product>, u64)>;

    async fn insert_product(&self, product: &Product) -> StoreResult<()>;

    /// Full replace. Returns false when no product has this id.
    async fn replace_product(&self, product: &Product) -> StoreResult<bool>;

    async fn set_trending(&self, id: &str, trending: bool) -> StoreResult<Option<Product>>;

    async fn delete_product(&self, id: &str) -> StoreResult<bool>;

    async fn count_products(&self) -> StoreResult<u64>;

    /// Subtracts `quantity` from the variant's own stock, or from the product
    /// stock when the variant has none. No floor is applied. Returns `None`
    /// when the product does not exist.
    async fn decrement_stock(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: i64,
    ) -> StoreResult<Option<StockDecrement>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> StoreResult<()>;

    async fn find_order(&self, id: &str) -> StoreResult<Option<Order>>;

    /// Newest first.
    async fn find_orders_by_customer(&self, customer_id: &str) -> StoreResult<Vec<Order>>;

    async fn list_orders(
        &self,
        delivery_status: Option<DeliveryStatus>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Order>, u64)>;

    async fn update_order(&self, id: &str, changes: &OrderChanges) -> StoreResult<Option<Order>>;

    /// Order count and summed total amount, optionally from `since` onward.
    async fn revenue_since(&self, since: Option<DateTime<Utc>>) -> StoreResult<(u64, f64)>;

    /// Orders placed at or after `since`, newest first.
    async fn find_orders_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Order>>;

    async fn count_orders(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_customer(&self, id: &str) -> StoreResult<Option<Customer>>;

    /// Case-sensitive.
    async fn find_customer_by_email(&self, email: &str) -> StoreResult<Option<Customer>>;

    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()>;

    async fn update_customer(
        &self,
        id: &str,
        changes: CustomerChanges,
    ) -> StoreResult<Option<Customer>>;

    async fn set_password(&self, id: &str, password_hash: &str) -> StoreResult<bool>;

    async fn set_password_by_email(&self, email: &str, password_hash: &str) -> StoreResult<bool>;

    /// `None` when the customer is missing, `Some(false)` when the product was
    /// already on the wishlist.
    async fn add_to_wishlist(&self, id: &str, product_id: &str) -> StoreResult<Option<bool>>;

    async fn list_customers(
        &self,
        status: Option<CustomerStatus>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Customer>, u64)>;

    async fn count_customers(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>>;

    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()>;

    async fn set_admin_password(&self, id: &str, password_hash: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Only returns records that have not expired yet.
    async fn find_verification(&self, email: &str) -> StoreResult<Option<Verification>>;

    async fn insert_verification(&self, record: &Verification) -> StoreResult<()>;

    async fn delete_verification(&self, email: &str, code: &str) -> StoreResult<bool>;

    async fn purge_verifications_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn find_settings(&self) -> StoreResult<Option<ProductSettings>>;

    async fn find_settings_by_id(&self, id: &str) -> StoreResult<Option<ProductSettings>>;

    async fn insert_settings(&self, settings: &ProductSettings) -> StoreResult<()>;

    async fn save_settings(&self, settings: &ProductSettings) -> StoreResult<bool>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the customer already reviewed
    /// the product for that order.
    async fn insert_review(&self, review: &Review) -> StoreResult<()>;

    /// Reviews of any of `product_ids`, oldest first.
    async fn find_reviews_for_products(&self, product_ids: &[String]) -> StoreResult<Vec<Review>>;
}

/// Everything the services need from persistence.
pub trait Store:
    CartStore
    + ProductStore
    + OrderStore
    + CustomerStore
    + AdminStore
    + VerificationStore
    + SettingsStore
    + ReviewStore
{
}

impl<T> Store for T where
    T: CartStore
        + ProductStore
        + OrderStore
        + CustomerStore
        + AdminStore
        + VerificationStore
        + SettingsStore
        + ReviewStore
{
}
