use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub store: String,
    /// Payment gateways with credentials configured.
    pub gateways: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let payments = &state.payments;
    let gateways = [
        ("stripe", payments.stripe.is_some()),
        ("razorpay", payments.razorpay.is_some()),
        ("cashfree", payments.cashfree.is_some()),
    ]
    .into_iter()
    .filter(|(_, enabled)| *enabled)
    .map(|(name, _)| name.to_string())
    .collect();

    let data = HealthData {
        status: "ok".to_string(),
        store: state.config.store.site_name.clone(),
        gateways,
    };

    Json(ApiResponse::success(
        "Health check",
        data,
        Some(Meta::empty()),
    ))
}
