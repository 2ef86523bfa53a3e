use anyhow::Context;

use crate::{
    dto::newsletter::NewsletterRequest,
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// One `@`, a non-empty local part and a dotted domain.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

pub async fn subscribe(
    state: &AppState,
    payload: NewsletterRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let email = payload.email.trim().to_lowercase();
    if !looks_like_email(&email) {
        return Err(AppError::BadRequest("Please enter a valid email".into()));
    }

    let contacts = state
        .newsletter
        .as_ref()
        .ok_or(AppError::Unavailable("Newsletter"))?;
    contacts
        .subscribe(&email)
        .await
        .context("Adding the email to newsletter failed")?;

    tracing::info!(email = %email, "newsletter signup");
    Ok(ApiResponse::success(
        "Added to newsletter successfully",
        serde_json::json!({ "email": email }),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_is_checked() {
        assert!(looks_like_email("dana@example.com"));
        assert!(!looks_like_email("dana.example.com"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("dana@example"));
        assert!(!looks_like_email("dana@@example.com"));
        assert!(!looks_like_email("dana@example..com"));
        assert!(!looks_like_email("da na@example.com"));
    }
}
