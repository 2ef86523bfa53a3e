//! In-process store used by the test-suite and for running without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{
    AdminStore, CartStore, CustomerStore, OrderStore, PageRequest, ProductFilter, ProductSort,
    ProductStore, ReviewStore, SettingsStore, StockDecrement, StoreError, StoreResult,
    VerificationStore,
};
use crate::{
    ids::new_document_id,
    models::{
        Admin, Cart, Customer, CustomerChanges, CustomerStatus, DeliveryStatus, LineItem, Order,
        OrderChanges, Product, ProductSettings, Review, Verification,
    },
};

#[derive(Debug, Default)]
struct Collections {
    carts: Vec<Cart>,
    products: Vec<Product>,
    orders: Vec<Order>,
    customers: Vec<Customer>,
    admins: Vec<Admin>,
    verifications: Vec<Verification>,
    settings: Vec<ProductSettings>,
    reviews: Vec<Review>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: PageRequest) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let page_items = items
        .into_iter()
        .skip(usize::try_from(page.offset).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
        .collect();
    (page_items, total)
}

/// Mirrors the `lower(name)` unique index of the SQL schema.
fn ensure_unique_name(products: &[Product], product: &Product) -> StoreResult<()> {
    let clash = products
        .iter()
        .any(|p| p.id != product.id && p.name.to_lowercase() == product.name.to_lowercase());
    if clash {
        return Err(StoreError::Duplicate(format!("product {}", product.name)));
    }
    Ok(())
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn find_cart(&self, id: &str) -> StoreResult<Option<Cart>> {
        let db = self.inner.read().await;
        Ok(db.carts.iter().find(|c| c.id == id).cloned())
    }

    async fn find_cart_by_owner(&self, owner_id: &str) -> StoreResult<Option<Cart>> {
        let db = self.inner.read().await;
        Ok(db.carts.iter().find(|c| c.owner_id == owner_id).cloned())
    }

    async fn upsert_cart_item(&self, owner_id: &str, item: LineItem) -> StoreResult<Cart> {
        let mut db = self.inner.write().await;
        let now = Utc::now();
        if let Some(cart) = db.carts.iter_mut().find(|c| c.owner_id == owner_id) {
            cart.merge_item(item);
            cart.updated_at = now;
            return Ok(cart.clone());
        }

        let mut cart = Cart {
            id: new_document_id(),
            owner_id: owner_id.to_string(),
            products: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        cart.merge_item(item);
        db.carts.push(cart.clone());
        Ok(cart)
    }

    async fn save_cart(&self, cart: &Cart) -> StoreResult<Option<Cart>> {
        let mut db = self.inner.write().await;
        Ok(db.carts.iter_mut().find(|c| c.id == cart.id).map(|stored| {
            stored.products = cart.products.clone();
            stored.updated_at = Utc::now();
            stored.clone()
        }))
    }

    async fn delete_cart(&self, id: &str) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        let before = db.carts.len();
        db.carts.retain(|c| c.id != id);
        Ok(db.carts.len() != before)
    }

    async fn purge_carts_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let mut db = self.inner.write().await;
        let before = db.carts.len();
        db.carts.retain(|c| c.created_at >= cutoff);
        Ok((before - db.carts.len()) as u64)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        let db = self.inner.read().await;
        Ok(db.products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_product_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        let db = self.inner.read().await;
        let name = name.to_lowercase();
        Ok(db
            .products
            .iter()
            .find(|p| p.name.to_lowercase() == name)
            .cloned())
    }

    async fn find_products_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Product>> {
        let db = self.inner.read().await;
        Ok(db
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Product>, u64)> {
        let db = self.inner.read().await;
        let mut items: Vec<Product> = db
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        match filter.sort {
            ProductSort::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ProductSort::PriceLowToHigh => {
                items.sort_by(|a, b| a.sale_price.total_cmp(&b.sale_price))
            }
            ProductSort::PriceHighToLow => {
                items.sort_by(|a, b| b.sale_price.total_cmp(&a.sale_price))
            }
        }
        Ok(paginate(items, page))
    }

    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        let mut db = self.inner.write().await;
        if db.products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::Duplicate(format!("product {}", product.id)));
        }
        ensure_unique_name(&db.products, product)?;
        db.products.push(product.clone());
        Ok(())
    }

    async fn replace_product(&self, product: &Product) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        ensure_unique_name(&db.products, product)?;
        match db.products.iter_mut().find(|p| p.id == product.id) {
            Some(stored) => {
                *stored = Product {
                    created_at: stored.created_at,
                    ..product.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_trending(&self, id: &str, trending: bool) -> StoreResult<Option<Product>> {
        let mut db = self.inner.write().await;
        Ok(db.products.iter_mut().find(|p| p.id == id).map(|p| {
            p.trending = trending;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete_product(&self, id: &str) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        let before = db.products.len();
        db.products.retain(|p| p.id != id);
        Ok(db.products.len() != before)
    }

    async fn count_products(&self) -> StoreResult<u64> {
        Ok(self.inner.read().await.products.len() as u64)
    }

    async fn decrement_stock(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: i64,
    ) -> StoreResult<Option<StockDecrement>> {
        let mut db = self.inner.write().await;
        let Some(product) = db.products.iter_mut().find(|p| p.id == product_id) else {
            return Ok(None);
        };

        let variant_stock = variant_id
            .and_then(|id| product.variants.iter_mut().find(|v| v.id == id))
            .and_then(|v| v.stock.as_mut());

        let outcome = match variant_stock {
            Some(stock) => {
                *stock -= quantity;
                StockDecrement::Variant { remaining: *stock }
            }
            None => {
                product.stock -= quantity;
                StockDecrement::Product {
                    remaining: product.stock,
                }
            }
        };
        product.updated_at = Utc::now();
        Ok(Some(outcome))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        let mut db = self.inner.write().await;
        db.orders.push(order.clone());
        Ok(())
    }

    async fn find_order(&self, id: &str) -> StoreResult<Option<Order>> {
        let db = self.inner.read().await;
        Ok(db.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn find_orders_by_customer(&self, customer_id: &str) -> StoreResult<Vec<Order>> {
        let db = self.inner.read().await;
        let mut orders: Vec<Order> = db
            .orders
            .iter()
            .filter(|o| o.customer.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_orders(
        &self,
        delivery_status: Option<DeliveryStatus>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Order>, u64)> {
        let db = self.inner.read().await;
        let mut orders: Vec<Order> = db
            .orders
            .iter()
            .filter(|o| delivery_status.is_none_or(|s| o.delivery_status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(orders, page))
    }

    async fn update_order(&self, id: &str, changes: &OrderChanges) -> StoreResult<Option<Order>> {
        let mut db = self.inner.write().await;
        Ok(db.orders.iter_mut().find(|o| o.id == id).map(|order| {
            if let Some(status) = changes.payment_status {
                order.payment_status = status;
            }
            if let Some(status) = changes.delivery_status {
                order.delivery_status = status;
            }
            if let Some(link) = &changes.tracking_link {
                order.tracking_link = Some(link.clone());
            }
            order.updated_at = Utc::now();
            order.clone()
        }))
    }

    async fn revenue_since(&self, since: Option<DateTime<Utc>>) -> StoreResult<(u64, f64)> {
        let db = self.inner.read().await;
        Ok(db
            .orders
            .iter()
            .filter(|o| since.is_none_or(|s| o.created_at >= s))
            .fold((0, 0.0), |(count, total), o| (count + 1, total + o.total_amount)))
    }

    async fn find_orders_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Order>> {
        let db = self.inner.read().await;
        let mut orders: Vec<Order> = db
            .orders
            .iter()
            .filter(|o| o.created_at >= since)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn count_orders(&self) -> StoreResult<u64> {
        Ok(self.inner.read().await.orders.len() as u64)
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn find_customer(&self, id: &str) -> StoreResult<Option<Customer>> {
        let db = self.inner.read().await;
        Ok(db.customers.iter().find(|c| c.id == id).cloned())
    }

    async fn find_customer_by_email(&self, email: &str) -> StoreResult<Option<Customer>> {
        let db = self.inner.read().await;
        Ok(db.customers.iter().find(|c| c.email == email).cloned())
    }

    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()> {
        let mut db = self.inner.write().await;
        if db.customers.iter().any(|c| c.email == customer.email) {
            return Err(StoreError::Duplicate(format!("customer {}", customer.email)));
        }
        db.customers.push(customer.clone());
        Ok(())
    }

    async fn update_customer(
        &self,
        id: &str,
        changes: CustomerChanges,
    ) -> StoreResult<Option<Customer>> {
        let mut db = self.inner.write().await;
        Ok(db.customers.iter_mut().find(|c| c.id == id).map(|customer| {
            changes.apply(customer);
            customer.updated_at = Utc::now();
            customer.clone()
        }))
    }

    async fn set_password(&self, id: &str, password_hash: &str) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        Ok(db
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| c.password_hash = Some(password_hash.to_string()))
            .is_some())
    }

    async fn set_password_by_email(&self, email: &str, password_hash: &str) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        Ok(db
            .customers
            .iter_mut()
            .find(|c| c.email == email)
            .map(|c| c.password_hash = Some(password_hash.to_string()))
            .is_some())
    }

    async fn add_to_wishlist(&self, id: &str, product_id: &str) -> StoreResult<Option<bool>> {
        let mut db = self.inner.write().await;
        Ok(db.customers.iter_mut().find(|c| c.id == id).map(|c| {
            if c.wishlist.iter().any(|p| p == product_id) {
                false
            } else {
                c.wishlist.push(product_id.to_string());
                true
            }
        }))
    }

    async fn list_customers(
        &self,
        status: Option<CustomerStatus>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Customer>, u64)> {
        let db = self.inner.read().await;
        let mut customers: Vec<Customer> = db
            .customers
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(customers, page))
    }

    async fn count_customers(&self) -> StoreResult<u64> {
        Ok(self.inner.read().await.customers.len() as u64)
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        let db = self.inner.read().await;
        Ok(db.admins.iter().find(|a| a.email == email).cloned())
    }

    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()> {
        let mut db = self.inner.write().await;
        if db.admins.iter().any(|a| a.email == admin.email) {
            return Err(StoreError::Duplicate(format!("admin {}", admin.email)));
        }
        db.admins.push(admin.clone());
        Ok(())
    }

    async fn set_admin_password(&self, id: &str, password_hash: &str) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        Ok(match db.admins.iter_mut().find(|a| a.id == id) {
            Some(admin) => {
                admin.password_hash = password_hash.to_string();
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl VerificationStore for MemoryStore {
    async fn find_verification(&self, email: &str) -> StoreResult<Option<Verification>> {
        let db = self.inner.read().await;
        let now = Utc::now();
        Ok(db
            .verifications
            .iter()
            .find(|v| v.email == email && !v.is_expired(now))
            .cloned())
    }

    async fn insert_verification(&self, record: &Verification) -> StoreResult<()> {
        let mut db = self.inner.write().await;
        let now = Utc::now();
        db.verifications.retain(|v| !v.is_expired(now));
        if db.verifications.iter().any(|v| v.email == record.email) {
            return Err(StoreError::Duplicate(format!("verification {}", record.email)));
        }
        db.verifications.push(record.clone());
        Ok(())
    }

    async fn delete_verification(&self, email: &str, code: &str) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        let before = db.verifications.len();
        db.verifications
            .retain(|v| !(v.email == email && v.code == code));
        Ok(db.verifications.len() != before)
    }

    async fn purge_verifications_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let mut db = self.inner.write().await;
        let before = db.verifications.len();
        db.verifications.retain(|v| v.created_at >= cutoff);
        Ok((before - db.verifications.len()) as u64)
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn find_settings(&self) -> StoreResult<Option<ProductSettings>> {
        let db = self.inner.read().await;
        Ok(db.settings.first().cloned())
    }

    async fn find_settings_by_id(&self, id: &str) -> StoreResult<Option<ProductSettings>> {
        let db = self.inner.read().await;
        Ok(db.settings.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_settings(&self, settings: &ProductSettings) -> StoreResult<()> {
        let mut db = self.inner.write().await;
        db.settings.push(settings.clone());
        Ok(())
    }

    async fn save_settings(&self, settings: &ProductSettings) -> StoreResult<bool> {
        let mut db = self.inner.write().await;
        match db.settings.iter_mut().find(|s| s.id == settings.id) {
            Some(stored) => {
                *stored = ProductSettings {
                    created_at: stored.created_at,
                    ..settings.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn insert_review(&self, review: &Review) -> StoreResult<()> {
        let mut db = self.inner.write().await;
        let exists = db.reviews.iter().any(|r| {
            r.product_id == review.product_id
                && r.customer_id == review.customer_id
                && r.order_id == review.order_id
        });
        if exists {
            return Err(StoreError::Duplicate(format!("review {}", review.order_id)));
        }
        db.reviews.push(review.clone());
        Ok(())
    }

    async fn find_reviews_for_products(&self, product_ids: &[String]) -> StoreResult<Vec<Review>> {
        let db = self.inner.read().await;
        let mut reviews: Vec<Review> = db
            .reviews
            .iter()
            .filter(|r| product_ids.contains(&r.product_id))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(reviews)
    }
}
