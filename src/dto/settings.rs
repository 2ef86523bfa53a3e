use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertSettingsRequest {
    /// Omit to create the store's settings document.
    pub id: Option<String>,
    pub categories: Vec<String>,
    pub product_card_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VariantOptionInput {
    pub id: Option<String>,
    pub value: String,
    pub meta: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VariantTaxonomyInput {
    /// Omit to append a new variant.
    pub id: Option<String>,
    pub name: String,
    pub options: Vec<VariantOptionInput>,
}
