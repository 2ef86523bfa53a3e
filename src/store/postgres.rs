//! PostgreSQL store backed by sea-orm. Embedded documents live in JSONB
//! columns; read-modify-write operations lock the row for the duration of a
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr, TransactionTrait,
    sea_query::{Expr, Func, LockType, OnConflict, extension::postgres::PgExpr},
};

use super::{
    AdminStore, CartStore, CustomerStore, OrderStore, PageRequest, ProductFilter, ProductSort,
    ProductStore, ReviewStore, SettingsStore, StockDecrement, StoreError, StoreResult,
    VerificationStore,
};
use crate::{
    entity::{
        admins::{self, Entity as Admins},
        carts::{self, Column as CartCol, Entity as Carts},
        customers::{self, Column as CustomerCol, Entity as Customers},
        orders::{self, Column as OrderCol, Entity as Orders},
        product_settings::{self, Column as SettingsCol, Entity as Settings},
        products::{self, Column as ProdCol, Entity as Products},
        reviews::{self, Column as ReviewCol, Entity as Reviews},
        verifications::{self, Column as VerificationCol, Entity as Verifications},
    },
    ids::new_document_id,
    models::{
        Admin, Cart, Customer, CustomerChanges, CustomerStatus, DeliveryStatus, LineItem, Order,
        OrderChanges, PaymentStatus, Product, ProductSettings, ProductType, Review, ReviewAuthor,
        VERIFICATION_TTL_MINUTES, VariantCombination, Verification,
    },
};

#[derive(Debug, Clone)]
pub struct PgStore {
    conn: DatabaseConnection,
}

impl PgStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}

fn paged<E: EntityTrait>(select: Select<E>, page: PageRequest) -> Select<E> {
    let select = select.offset(page.offset);
    if page.limit >= i64::MAX as u64 {
        select
    } else {
        select.limit(page.limit)
    }
}

fn unique_violation(err: DbErr, key: String) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Duplicate(key),
        _ => StoreError::Db(err),
    }
}

fn cart_from_entity(model: carts::Model) -> StoreResult<Cart> {
    Ok(Cart {
        id: model.id,
        owner_id: model.owner_id,
        products: serde_json::from_value(model.products)?,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn product_from_entity(model: products::Model) -> StoreResult<Product> {
    Ok(Product {
        id: model.id,
        name: model.name,
        description: model.description,
        category: model.category,
        product_type: ProductType::parse(&model.product_type),
        images: serde_json::from_value(model.images)?,
        regular_price: model.regular_price,
        sale_price: model.sale_price,
        tax: model.tax,
        stock: model.stock,
        variants: serde_json::from_value(model.variants)?,
        trending: model.trending,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn product_to_active(product: &Product) -> StoreResult<products::ActiveModel> {
    Ok(products::ActiveModel {
        id: Set(product.id.clone()),
        name: Set(product.name.clone()),
        description: Set(product.description.clone()),
        category: Set(product.category.clone()),
        product_type: Set(product.product_type.as_str().to_string()),
        images: Set(serde_json::to_value(&product.images)?),
        regular_price: Set(product.regular_price),
        sale_price: Set(product.sale_price),
        tax: Set(product.tax),
        stock: Set(product.stock),
        variants: Set(serde_json::to_value(&product.variants)?),
        trending: Set(product.trending),
        created_at: Set(product.created_at.into()),
        updated_at: Set(product.updated_at.into()),
    })
}

fn order_from_entity(model: orders::Model) -> StoreResult<Order> {
    Ok(Order {
        id: model.id,
        customer: serde_json::from_value(model.customer)?,
        products: serde_json::from_value(model.products)?,
        applied_coupon: model.applied_coupon,
        coupon_discount: model.coupon_discount,
        payment_method: model.payment_method,
        payment_status: PaymentStatus::parse(&model.payment_status).unwrap_or_default(),
        delivery_status: DeliveryStatus::parse(&model.delivery_status).unwrap_or_default(),
        mrp: model.mrp,
        taxes: model.taxes,
        total_amount: model.total_amount,
        shipping_fees: model.shipping_fees,
        expected_delivery: model.expected_delivery,
        tracking_link: model.tracking_link,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn customer_from_entity(model: customers::Model) -> StoreResult<Customer> {
    Ok(Customer {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        avatar: model.avatar,
        email: model.email,
        phone_number: model.phone_number,
        gender: model.gender,
        dob: model.dob,
        address: model.address.map(serde_json::from_value).transpose()?,
        wishlist: serde_json::from_value(model.wishlist)?,
        status: CustomerStatus::parse(&model.status),
        password_hash: model.password_hash,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn customer_to_active(customer: &Customer) -> StoreResult<customers::ActiveModel> {
    Ok(customers::ActiveModel {
        id: Set(customer.id.clone()),
        first_name: Set(customer.first_name.clone()),
        last_name: Set(customer.last_name.clone()),
        avatar: Set(customer.avatar.clone()),
        email: Set(customer.email.clone()),
        phone_number: Set(customer.phone_number.clone()),
        gender: Set(customer.gender.clone()),
        dob: Set(customer.dob.clone()),
        address: Set(customer
            .address
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?),
        wishlist: Set(serde_json::to_value(&customer.wishlist)?),
        status: Set(customer.status.as_str().to_string()),
        password_hash: Set(customer.password_hash.clone()),
        created_at: Set(customer.created_at.into()),
        updated_at: Set(customer.updated_at.into()),
    })
}

fn settings_from_entity(model: product_settings::Model) -> StoreResult<ProductSettings> {
    Ok(ProductSettings {
        id: model.id,
        categories: serde_json::from_value(model.categories)?,
        variants: serde_json::from_value(model.variants)?,
        product_card_type: model.product_card_type,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn settings_to_active(settings: &ProductSettings) -> StoreResult<product_settings::ActiveModel> {
    Ok(product_settings::ActiveModel {
        id: Set(settings.id.clone()),
        categories: Set(serde_json::to_value(&settings.categories)?),
        variants: Set(serde_json::to_value(&settings.variants)?),
        product_card_type: Set(settings.product_card_type.clone()),
        created_at: Set(settings.created_at.into()),
        updated_at: Set(settings.updated_at.into()),
    })
}

/// `ILIKE` pattern matching `term` anywhere, with its own `%`, `_` and `\`
/// taken literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn product_condition(filter: &ProductFilter) -> Condition {
    let mut condition = Condition::all();

    if !filter.categories.is_empty() {
        condition = condition.add(ProdCol::Category.is_in(filter.categories.iter().cloned()));
    }

    if !filter.price_ranges.is_empty() {
        let ranges = filter
            .price_ranges
            .iter()
            .fold(Condition::any(), |any, (min, max)| {
                any.add(ProdCol::SalePrice.between(*min, *max))
            });
        condition = condition.add(ranges);
    }

    if filter.trending {
        condition = condition.add(ProdCol::Trending.eq(true));
    }
    if filter.in_stock {
        condition = condition.add(ProdCol::Stock.gt(0));
    }
    if filter.out_of_stock {
        condition = condition.add(ProdCol::Stock.lte(0));
    }

    if let Some(search) = filter.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProdCol::Name).ilike(pattern.clone()))
                .add(Expr::col(ProdCol::Description).ilike(pattern.clone()))
                .add(Expr::col(ProdCol::Category).ilike(pattern)),
        );
    }

    condition
}

#[async_trait]
impl CartStore for PgStore {
    async fn find_cart(&self, id: &str) -> StoreResult<Option<Cart>> {
        Carts::find_by_id(id.to_string())
            .one(&self.conn)
            .await?
            .map(cart_from_entity)
            .transpose()
    }

    async fn find_cart_by_owner(&self, owner_id: &str) -> StoreResult<Option<Cart>> {
        Carts::find()
            .filter(CartCol::OwnerId.eq(owner_id))
            .one(&self.conn)
            .await?
            .map(cart_from_entity)
            .transpose()
    }

    async fn upsert_cart_item(&self, owner_id: &str, item: LineItem) -> StoreResult<Cart> {
        let txn = self.conn.begin().await?;
        let now = Utc::now();

        Carts::insert(carts::ActiveModel {
            id: Set(new_document_id()),
            owner_id: Set(owner_id.to_string()),
            products: Set(serde_json::json!([])),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        })
        .on_conflict(OnConflict::column(CartCol::OwnerId).do_nothing().to_owned())
        .exec_without_returning(&txn)
        .await?;

        let model = Carts::find()
            .filter(CartCol::OwnerId.eq(owner_id))
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("cart for owner {owner_id}")))?;

        let mut cart = cart_from_entity(model)?;
        cart.merge_item(item);

        let mut active: carts::ActiveModel = carts::ActiveModel {
            id: Set(cart.id.clone()),
            ..Default::default()
        };
        active.products = Set(serde_json::to_value(&cart.products)?);
        active.updated_at = Set(now.into());
        active.update(&txn).await?;

        txn.commit().await?;
        cart.updated_at = now;
        Ok(cart)
    }

    async fn save_cart(&self, cart: &Cart) -> StoreResult<Option<Cart>> {
        let txn = self.conn.begin().await?;

        let existing = Carts::find_by_id(cart.id.clone())
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: carts::ActiveModel = existing.into();
        active.products = Set(serde_json::to_value(&cart.products)?);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&txn).await?;

        txn.commit().await?;
        cart_from_entity(model).map(Some)
    }

    async fn delete_cart(&self, id: &str) -> StoreResult<bool> {
        let result = Carts::delete_by_id(id.to_string()).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    async fn purge_carts_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let result = Carts::delete_many()
            .filter(CartCol::CreatedAt.lt(cutoff))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Products::find_by_id(id.to_string())
            .one(&self.conn)
            .await?
            .map(product_from_entity)
            .transpose()
    }

    async fn find_product_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        Products::find()
            .filter(Expr::expr(Func::lower(Expr::col(ProdCol::Name))).eq(name.to_lowercase()))
            .one(&self.conn)
            .await?
            .map(product_from_entity)
            .transpose()
    }

    async fn find_products_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Products::find()
            .filter(ProdCol::Id.is_in(ids.iter().cloned()))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect()
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Product>, u64)> {
        let mut finder = Products::find().filter(product_condition(filter));
        finder = match filter.sort {
            ProductSort::Newest => finder.order_by_desc(ProdCol::CreatedAt),
            ProductSort::PriceLowToHigh => finder.order_by_asc(ProdCol::SalePrice),
            ProductSort::PriceHighToLow => finder.order_by_desc(ProdCol::SalePrice),
        };

        let total = finder.clone().count(&self.conn).await?;

        let items = paged(finder, page)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok((items, total))
    }

    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        product_to_active(product)?
            .insert(&self.conn)
            .await
            .map_err(|err| unique_violation(err, format!("product {}", product.name)))?;
        Ok(())
    }

    async fn replace_product(&self, product: &Product) -> StoreResult<bool> {
        let txn = self.conn.begin().await?;

        let existing = Products::find_by_id(product.id.clone())
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let Some(existing) = existing else {
            return Ok(false);
        };

        let mut active = product_to_active(product)?;
        active.created_at = Set(existing.created_at);
        active
            .update(&txn)
            .await
            .map_err(|err| unique_violation(err, format!("product {}", product.name)))?;

        txn.commit().await?;
        Ok(true)
    }

    async fn set_trending(&self, id: &str, trending: bool) -> StoreResult<Option<Product>> {
        let existing = Products::find_by_id(id.to_string()).one(&self.conn).await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: products::ActiveModel = existing.into();
        active.trending = Set(trending);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.conn).await?;
        product_from_entity(model).map(Some)
    }

    async fn delete_product(&self, id: &str) -> StoreResult<bool> {
        let result = Products::delete_by_id(id.to_string())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn count_products(&self) -> StoreResult<u64> {
        Ok(Products::find().count(&self.conn).await?)
    }

    async fn decrement_stock(
        &self,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: i64,
    ) -> StoreResult<Option<StockDecrement>> {
        let txn = self.conn.begin().await?;

        let existing = Products::find_by_id(product_id.to_string())
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut variants: Vec<VariantCombination> =
            serde_json::from_value(existing.variants.clone())?;
        let variant_stock = variant_id
            .and_then(|id| variants.iter_mut().find(|v| v.id == id))
            .and_then(|v| v.stock.as_mut());

        let mut active: products::ActiveModel = existing.clone().into();
        let outcome = match variant_stock {
            Some(stock) => {
                *stock -= quantity;
                let remaining = *stock;
                active.variants = Set(serde_json::to_value(&variants)?);
                StockDecrement::Variant { remaining }
            }
            None => {
                let remaining = existing.stock - quantity;
                active.stock = Set(remaining);
                StockDecrement::Product { remaining }
            }
        };
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(outcome))
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        orders::ActiveModel {
            id: Set(order.id.clone()),
            customer_id: Set(order.customer.customer_id.clone()),
            customer: Set(serde_json::to_value(&order.customer)?),
            products: Set(serde_json::to_value(&order.products)?),
            applied_coupon: Set(order.applied_coupon.clone()),
            coupon_discount: Set(order.coupon_discount),
            payment_method: Set(order.payment_method.clone()),
            payment_status: Set(order.payment_status.as_str().to_string()),
            delivery_status: Set(order.delivery_status.as_str().to_string()),
            mrp: Set(order.mrp),
            taxes: Set(order.taxes),
            total_amount: Set(order.total_amount),
            shipping_fees: Set(order.shipping_fees.clone()),
            expected_delivery: Set(order.expected_delivery.clone()),
            tracking_link: Set(order.tracking_link.clone()),
            created_at: Set(order.created_at.into()),
            updated_at: Set(order.updated_at.into()),
        }
        .insert(&self.conn)
        .await?;
        Ok(())
    }

    async fn find_order(&self, id: &str) -> StoreResult<Option<Order>> {
        Orders::find_by_id(id.to_string())
            .one(&self.conn)
            .await?
            .map(order_from_entity)
            .transpose()
    }

    async fn find_orders_by_customer(&self, customer_id: &str) -> StoreResult<Vec<Order>> {
        Orders::find()
            .filter(OrderCol::CustomerId.eq(customer_id))
            .order_by_desc(OrderCol::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(order_from_entity)
            .collect()
    }

    async fn list_orders(
        &self,
        delivery_status: Option<DeliveryStatus>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Order>, u64)> {
        let mut condition = Condition::all();
        if let Some(status) = delivery_status {
            condition = condition.add(OrderCol::DeliveryStatus.eq(status.as_str()));
        }

        let finder = Orders::find()
            .filter(condition)
            .order_by_desc(OrderCol::CreatedAt);

        let total = finder.clone().count(&self.conn).await?;

        let items = paged(finder, page)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(order_from_entity)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok((items, total))
    }

    async fn update_order(&self, id: &str, changes: &OrderChanges) -> StoreResult<Option<Order>> {
        let txn = self.conn.begin().await?;

        let existing = Orders::find_by_id(id.to_string())
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: orders::ActiveModel = existing.into();
        if let Some(status) = changes.payment_status {
            active.payment_status = Set(status.as_str().to_string());
        }
        if let Some(status) = changes.delivery_status {
            active.delivery_status = Set(status.as_str().to_string());
        }
        if let Some(link) = &changes.tracking_link {
            active.tracking_link = Set(Some(link.clone()));
        }
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&txn).await?;

        txn.commit().await?;
        order_from_entity(model).map(Some)
    }

    async fn revenue_since(&self, since: Option<DateTime<Utc>>) -> StoreResult<(u64, f64)> {
        let mut finder = Orders::find().select_only();
        if let Some(since) = since {
            finder = finder.filter(OrderCol::CreatedAt.gte(since));
        }

        let row = finder
            .column_as(Expr::col(OrderCol::Id).count(), "count")
            .column_as(Expr::col(OrderCol::TotalAmount).sum(), "total")
            .into_tuple::<(i64, Option<f64>)>()
            .one(&self.conn)
            .await?;

        Ok(row
            .map(|(count, total)| (count.max(0) as u64, total.unwrap_or(0.0)))
            .unwrap_or((0, 0.0)))
    }

    async fn find_orders_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Order>> {
        Orders::find()
            .filter(OrderCol::CreatedAt.gte(since))
            .order_by_desc(OrderCol::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(order_from_entity)
            .collect()
    }

    async fn count_orders(&self) -> StoreResult<u64> {
        Ok(Orders::find().count(&self.conn).await?)
    }
}

#[async_trait]
impl CustomerStore for PgStore {
    async fn find_customer(&self, id: &str) -> StoreResult<Option<Customer>> {
        Customers::find_by_id(id.to_string())
            .one(&self.conn)
            .await?
            .map(customer_from_entity)
            .transpose()
    }

    async fn find_customer_by_email(&self, email: &str) -> StoreResult<Option<Customer>> {
        Customers::find()
            .filter(CustomerCol::Email.eq(email))
            .one(&self.conn)
            .await?
            .map(customer_from_entity)
            .transpose()
    }

    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()> {
        customer_to_active(customer)?
            .insert(&self.conn)
            .await
            .map_err(|err| unique_violation(err, format!("customer {}", customer.email)))?;
        Ok(())
    }

    async fn update_customer(
        &self,
        id: &str,
        changes: CustomerChanges,
    ) -> StoreResult<Option<Customer>> {
        let txn = self.conn.begin().await?;

        let existing = Customers::find_by_id(id.to_string())
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut customer = customer_from_entity(existing)?;
        changes.apply(&mut customer);
        customer.updated_at = Utc::now();
        customer_to_active(&customer)?.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(customer))
    }

    async fn set_password(&self, id: &str, password_hash: &str) -> StoreResult<bool> {
        let result = Customers::update_many()
            .col_expr(CustomerCol::PasswordHash, Expr::value(password_hash))
            .col_expr(CustomerCol::UpdatedAt, Expr::value(Utc::now()))
            .filter(CustomerCol::Id.eq(id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn set_password_by_email(&self, email: &str, password_hash: &str) -> StoreResult<bool> {
        let result = Customers::update_many()
            .col_expr(CustomerCol::PasswordHash, Expr::value(password_hash))
            .col_expr(CustomerCol::UpdatedAt, Expr::value(Utc::now()))
            .filter(CustomerCol::Email.eq(email))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn add_to_wishlist(&self, id: &str, product_id: &str) -> StoreResult<Option<bool>> {
        let txn = self.conn.begin().await?;

        let existing = Customers::find_by_id(id.to_string())
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut wishlist: Vec<String> = serde_json::from_value(existing.wishlist.clone())?;
        if wishlist.iter().any(|p| p == product_id) {
            return Ok(Some(false));
        }
        wishlist.push(product_id.to_string());

        let mut active: customers::ActiveModel = existing.into();
        active.wishlist = Set(serde_json::to_value(&wishlist)?);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(Some(true))
    }

    async fn list_customers(
        &self,
        status: Option<CustomerStatus>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Customer>, u64)> {
        let mut condition = Condition::all();
        if let Some(status) = status {
            condition = condition.add(CustomerCol::Status.eq(status.as_str()));
        }

        let finder = Customers::find()
            .filter(condition)
            .order_by_desc(CustomerCol::CreatedAt);

        let total = finder.clone().count(&self.conn).await?;

        let items = paged(finder, page)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(customer_from_entity)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok((items, total))
    }

    async fn count_customers(&self) -> StoreResult<u64> {
        Ok(Customers::find().count(&self.conn).await?)
    }
}

#[async_trait]
impl AdminStore for PgStore {
    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        Ok(Admins::find()
            .filter(admins::Column::Email.eq(email))
            .one(&self.conn)
            .await?
            .map(|model| Admin {
                id: model.id,
                name: model.name,
                email: model.email,
                password_hash: model.password_hash,
                created_at: model.created_at.with_timezone(&Utc),
            }))
    }

    async fn insert_admin(&self, admin: &Admin) -> StoreResult<()> {
        admins::ActiveModel {
            id: Set(admin.id.clone()),
            name: Set(admin.name.clone()),
            email: Set(admin.email.clone()),
            password_hash: Set(admin.password_hash.clone()),
            created_at: Set(admin.created_at.into()),
        }
        .insert(&self.conn)
        .await
        .map_err(|err| unique_violation(err, format!("admin {}", admin.email)))?;
        Ok(())
    }

    async fn set_admin_password(&self, id: &str, password_hash: &str) -> StoreResult<bool> {
        let result = Admins::update_many()
            .col_expr(admins::Column::PasswordHash, Expr::value(password_hash))
            .filter(admins::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl VerificationStore for PgStore {
    async fn find_verification(&self, email: &str) -> StoreResult<Option<Verification>> {
        let cutoff = Utc::now() - Duration::minutes(VERIFICATION_TTL_MINUTES);
        Ok(Verifications::find()
            .filter(
                Condition::all()
                    .add(VerificationCol::Email.eq(email))
                    .add(VerificationCol::CreatedAt.gt(cutoff)),
            )
            .one(&self.conn)
            .await?
            .map(|model| Verification {
                email: model.email,
                code: model.code,
                created_at: model.created_at.with_timezone(&Utc),
            }))
    }

    async fn insert_verification(&self, record: &Verification) -> StoreResult<()> {
        let txn = self.conn.begin().await?;
        let cutoff = Utc::now() - Duration::minutes(VERIFICATION_TTL_MINUTES);

        Verifications::delete_many()
            .filter(
                Condition::all()
                    .add(VerificationCol::Email.eq(record.email.as_str()))
                    .add(VerificationCol::CreatedAt.lte(cutoff)),
            )
            .exec(&txn)
            .await?;

        verifications::ActiveModel {
            email: Set(record.email.clone()),
            code: Set(record.code.clone()),
            created_at: Set(record.created_at.into()),
        }
        .insert(&txn)
        .await
        .map_err(|err| unique_violation(err, format!("verification {}", record.email)))?;

        txn.commit().await?;
        Ok(())
    }

    async fn delete_verification(&self, email: &str, code: &str) -> StoreResult<bool> {
        let result = Verifications::delete_many()
            .filter(
                Condition::all()
                    .add(VerificationCol::Email.eq(email))
                    .add(VerificationCol::Code.eq(code)),
            )
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn purge_verifications_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let result = Verifications::delete_many()
            .filter(VerificationCol::CreatedAt.lt(cutoff))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl SettingsStore for PgStore {
    async fn find_settings(&self) -> StoreResult<Option<ProductSettings>> {
        Settings::find()
            .order_by_asc(SettingsCol::CreatedAt)
            .one(&self.conn)
            .await?
            .map(settings_from_entity)
            .transpose()
    }

    async fn find_settings_by_id(&self, id: &str) -> StoreResult<Option<ProductSettings>> {
        Settings::find_by_id(id.to_string())
            .one(&self.conn)
            .await?
            .map(settings_from_entity)
            .transpose()
    }

    async fn insert_settings(&self, settings: &ProductSettings) -> StoreResult<()> {
        settings_to_active(settings)?.insert(&self.conn).await?;
        Ok(())
    }

    async fn save_settings(&self, settings: &ProductSettings) -> StoreResult<bool> {
        let txn = self.conn.begin().await?;

        let existing = Settings::find_by_id(settings.id.clone())
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let Some(existing) = existing else {
            return Ok(false);
        };

        let mut active = settings_to_active(settings)?;
        active.created_at = Set(existing.created_at);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }
}

fn review_from_entity(model: reviews::Model) -> Review {
    Review {
        id: model.id,
        product_id: model.product_id,
        customer_id: model.customer_id,
        customer: ReviewAuthor {
            first_name: model.author_first_name,
            last_name: model.author_last_name,
        },
        order_id: model.order_id,
        rating: model.rating,
        comment: model.comment,
        media: model.media,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn insert_review(&self, review: &Review) -> StoreResult<()> {
        reviews::ActiveModel {
            id: Set(review.id.clone()),
            product_id: Set(review.product_id.clone()),
            customer_id: Set(review.customer_id.clone()),
            author_first_name: Set(review.customer.first_name.clone()),
            author_last_name: Set(review.customer.last_name.clone()),
            order_id: Set(review.order_id.clone()),
            rating: Set(review.rating),
            comment: Set(review.comment.clone()),
            media: Set(review.media.clone()),
            created_at: Set(review.created_at.into()),
        }
        .insert(&self.conn)
        .await
        .map_err(|err| unique_violation(err, format!("review {}", review.order_id)))?;
        Ok(())
    }

    async fn find_reviews_for_products(&self, product_ids: &[String]) -> StoreResult<Vec<Review>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(Reviews::find()
            .filter(ReviewCol::ProductId.is_in(product_ids.iter().cloned()))
            .order_by_asc(ReviewCol::CreatedAt)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(review_from_entity)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_terms_are_matched_literally() {
        assert_eq!(contains_pattern("tee"), "%tee%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }
}
