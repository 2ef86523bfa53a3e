use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, ProductType, Review};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VariantInput {
    /// Omit to create a new combination.
    pub id: Option<String>,
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub regular_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub tax: Option<f64>,
    pub stock: Option<i64>,
}

/// Create when `id` is absent, full replace otherwise.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpsertProductRequest {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default)]
    pub images: Vec<String>,
    pub regular_price: f64,
    pub sale_price: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
    #[serde(default)]
    pub trending: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TrendingRequest {
    pub trending: bool,
}

/// A product together with its reviews, oldest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductDetail>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddReviewRequest {
    /// The delivered order the product was bought in.
    pub order_id: String,
    /// 1 to 5, fractions allowed.
    pub rating: f64,
    pub comment: Option<String>,
    /// Image or video URL.
    pub media: Option<String>,
}
