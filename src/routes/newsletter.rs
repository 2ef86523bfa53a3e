use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::newsletter::NewsletterRequest, error::AppResult, response::ApiResponse,
    services::newsletter_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(subscribe))
}

#[utoipa::path(
    post,
    path = "/api/newsletter",
    request_body = NewsletterRequest,
    responses(
        (
            status = 200,
            description = "Email added to the list",
            body = ApiResponse<serde_json::Value>
        ),
        (status = 400, description = "Please enter a valid email"),
        (status = 503, description = "Newsletter is not configured"),
    ),
    tag = "Newsletter"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<NewsletterRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = newsletter_service::subscribe(&state, payload).await?;
    Ok(Json(resp))
}
