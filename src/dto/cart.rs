use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Cart, LineItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemRequest {
    /// Falls back to the `cart_id` cookie when omitted.
    pub cart_id: Option<String>,
    pub product_id: String,
    pub name: String,
    pub images: Vec<String>,
    pub price: f64,
    pub tax: f64,
    pub variant_id: Option<String>,
    pub variant_name: Option<String>,
}

impl AddItemRequest {
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            product_id: self.product_id,
            name: self.name,
            images: self.images,
            price: self.price,
            tax: self.tax,
            variant_id: self.variant_id,
            variant_name: self.variant_name,
            quantity: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuantityAction {
    Increment,
    Decrement,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeQuantityRequest {
    pub cart_id: Option<String>,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub action: QuantityAction,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveItemRequest {
    pub cart_id: Option<String>,
    pub product_id: String,
    pub variant_id: Option<String>,
}

/// Cart as returned to clients. The owner id stays server-side.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub id: String,
    pub products: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        Self {
            id: cart.id,
            products: cart.products,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}
