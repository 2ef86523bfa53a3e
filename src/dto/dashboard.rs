use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::LineItem;

/// Line items of one order placed inside the dashboard window.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SoldProducts {
    pub order_id: String,
    pub products: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SoldProductsList {
    pub items: Vec<SoldProducts>,
    pub since: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CountedModel {
    Products,
    Orders,
    Customers,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionCount {
    pub model: CountedModel,
    pub count: u64,
}
