use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How long a verification code stays redeemable.
pub const VERIFICATION_TTL_MINUTES: i64 = 15;

/// Carts created longer ago than this are purged.
pub const CART_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: Option<String>,
}

/// One product/variant entry in a cart or order. Name, images, price and tax
/// are captured when the item is added and never follow later catalog edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub images: Vec<String>,
    pub price: f64,
    pub tax: f64,
    pub variant_id: Option<String>,
    pub variant_name: Option<String>,
    pub quantity: i64,
}

impl LineItem {
    /// Exact identity match: an absent variant only matches an absent variant.
    pub fn matches(&self, product_id: &str, variant_id: Option<&str>) -> bool {
        self.product_id == product_id && self.variant_id.as_deref() == variant_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub id: String,
    pub owner_id: String,
    pub products: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn item_mut(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
    ) -> Option<&mut LineItem> {
        self.products
            .iter_mut()
            .find(|item| item.matches(product_id, variant_id))
    }

    /// Adds one unit of `item`, merging into an existing line when the
    /// product/variant pair is already present.
    pub fn merge_item(&mut self, mut item: LineItem) {
        match self.item_mut(&item.product_id, item.variant_id.as_deref()) {
            Some(existing) => existing.quantity += 1,
            None => {
                item.quantity = 1;
                self.products.push(item);
            }
        }
    }

    /// Removes the first matching line. Returns false when nothing matched.
    pub fn remove_item(&mut self, product_id: &str, variant_id: Option<&str>) -> bool {
        match self
            .products
            .iter()
            .position(|item| item.matches(product_id, variant_id))
        {
            Some(index) => {
                self.products.remove(index);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Simple,
    Variable,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Simple => "simple",
            ProductType::Variable => "variable",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "variable" => ProductType::Variable,
            _ => ProductType::Simple,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VariantCombination {
    pub id: String,
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub regular_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub tax: Option<f64>,
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub product_type: ProductType,
    pub images: Vec<String>,
    pub regular_price: f64,
    pub sale_price: f64,
    pub tax: f64,
    pub stock: i64,
    pub variants: Vec<VariantCombination>,
    pub trending: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn variant(&self, variant_id: &str) -> Option<&VariantCombination> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Live stock for a product or one of its variants. A variant without its
    /// own stock, or an unknown variant, falls back to the product stock.
    pub fn available_stock(&self, variant_id: Option<&str>) -> i64 {
        variant_id
            .and_then(|id| self.variant(id))
            .and_then(|v| v.stock)
            .unwrap_or(self.stock)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Processing => "processing",
            DeliveryStatus::Shipped => "shipped",
            DeliveryStatus::Delivered => "delivered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "processing" => Some(DeliveryStatus::Processing),
            "shipped" => Some(DeliveryStatus::Shipped),
            "delivered" => Some(DeliveryStatus::Delivered),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderCustomer {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: String,
    pub customer: OrderCustomer,
    pub products: Vec<LineItem>,
    pub applied_coupon: Option<String>,
    pub coupon_discount: Option<i64>,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub mrp: f64,
    pub taxes: f64,
    pub total_amount: f64,
    pub shipping_fees: String,
    pub expected_delivery: String,
    pub tracking_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields an admin may change after an order is placed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderChanges {
    pub payment_status: Option<PaymentStatus>,
    pub delivery_status: Option<DeliveryStatus>,
    pub tracking_link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    #[default]
    Active,
    Suspended,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "active",
            CustomerStatus::Suspended => "suspended",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "suspended" => CustomerStatus::Suspended,
            _ => CustomerStatus::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub address: Option<Address>,
    pub wishlist: Vec<String>,
    pub status: CustomerStatus,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields that may be changed by the customer or an admin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub address: Option<Address>,
    pub status: Option<CustomerStatus>,
}

impl CustomerChanges {
    pub fn apply(self, customer: &mut Customer) {
        if let Some(first_name) = self.first_name {
            customer.first_name = Some(first_name);
        }
        if let Some(last_name) = self.last_name {
            customer.last_name = Some(last_name);
        }
        if let Some(avatar) = self.avatar {
            customer.avatar = Some(avatar);
        }
        if let Some(phone_number) = self.phone_number {
            customer.phone_number = Some(phone_number);
        }
        if let Some(gender) = self.gender {
            customer.gender = Some(gender);
        }
        if let Some(dob) = self.dob {
            customer.dob = Some(dob);
        }
        if let Some(address) = self.address {
            customer.address = Some(address);
        }
        if let Some(status) = self.status {
            customer.status = status;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub email: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl Verification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::minutes(VERIFICATION_TTL_MINUTES)
    }
}

/// Display name on a review, copied from the customer when the review is
/// written.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReviewAuthor {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Review {
    pub id: String,
    pub product_id: String,
    #[serde(skip_serializing)]
    pub customer_id: String,
    pub customer: ReviewAuthor,
    pub order_id: String,
    pub rating: f64,
    pub comment: Option<String>,
    pub media: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VariantOption {
    pub id: String,
    pub value: String,
    pub meta: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VariantDefinition {
    pub id: String,
    pub name: String,
    pub options: Vec<VariantOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSettings {
    pub id: String,
    pub categories: Vec<String>,
    pub variants: Vec<VariantDefinition>,
    pub product_card_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: &str, variant_id: Option<&str>) -> LineItem {
        LineItem {
            product_id: product_id.into(),
            name: "Tee".into(),
            images: vec![],
            price: 10.0,
            tax: 1.0,
            variant_id: variant_id.map(Into::into),
            variant_name: None,
            quantity: 1,
        }
    }

    fn cart() -> Cart {
        let now = Utc::now();
        Cart {
            id: "c".into(),
            owner_id: "o".into(),
            products: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn merge_keys_on_product_and_variant() {
        let mut cart = cart();
        cart.merge_item(item("p1", None));
        cart.merge_item(item("p1", Some("v1")));
        cart.merge_item(item("p1", None));

        assert_eq!(cart.products.len(), 2);
        assert_eq!(cart.products[0].quantity, 2);
        assert_eq!(cart.products[1].quantity, 1);
    }

    #[test]
    fn merge_resets_incoming_quantity() {
        let mut cart = cart();
        let mut incoming = item("p1", None);
        incoming.quantity = 7;
        cart.merge_item(incoming);
        assert_eq!(cart.products[0].quantity, 1);
    }

    #[test]
    fn remove_requires_exact_variant_match() {
        let mut cart = cart();
        cart.merge_item(item("p1", Some("v1")));
        assert!(!cart.remove_item("p1", None));
        assert!(cart.remove_item("p1", Some("v1")));
        assert!(cart.products.is_empty());
    }

    #[test]
    fn variant_without_stock_falls_back_to_product() {
        let now = Utc::now();
        let product = Product {
            id: "p1".into(),
            name: "Tee".into(),
            description: String::new(),
            category: "shirts".into(),
            product_type: ProductType::Variable,
            images: vec![],
            regular_price: 20.0,
            sale_price: 15.0,
            tax: 0.0,
            stock: 9,
            variants: vec![
                VariantCombination {
                    id: "v1".into(),
                    attributes: BTreeMap::new(),
                    images: vec![],
                    regular_price: None,
                    sale_price: None,
                    tax: None,
                    stock: Some(2),
                },
                VariantCombination {
                    id: "v2".into(),
                    attributes: BTreeMap::new(),
                    images: vec![],
                    regular_price: None,
                    sale_price: None,
                    tax: None,
                    stock: None,
                },
            ],
            trending: false,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(product.available_stock(Some("v1")), 2);
        assert_eq!(product.available_stock(Some("v2")), 9);
        assert_eq!(product.available_stock(Some("missing")), 9);
        assert_eq!(product.available_stock(None), 9);
    }

    #[test]
    fn verification_expires_after_ttl() {
        let created_at = Utc::now() - Duration::minutes(VERIFICATION_TTL_MINUTES);
        let record = Verification {
            email: "a@b.c".into(),
            code: "123456".into(),
            created_at,
        };
        assert!(record.is_expired(Utc::now()));
        assert!(!record.is_expired(created_at + Duration::minutes(1)));
    }
}
