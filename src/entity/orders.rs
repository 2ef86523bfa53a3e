use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: String,
    /// Customer snapshot taken at checkout.
    pub customer: Json,
    pub products: Json,
    pub applied_coupon: Option<String>,
    pub coupon_discount: Option<i64>,
    pub payment_method: String,
    pub payment_status: String,
    pub delivery_status: String,
    pub mrp: f64,
    pub taxes: f64,
    pub total_amount: f64,
    pub shipping_fees: String,
    pub expected_delivery: String,
    pub tracking_link: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
