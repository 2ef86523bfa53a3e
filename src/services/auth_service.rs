use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use rand::Rng;

use crate::{
    dto::auth::{
        ChangeAdminPasswordRequest, ChangePasswordRequest, LoginRequest, LoginResponse,
        RegisterRequest, ResetPasswordRequest, VerificationCodeRequest,
    },
    error::{AppError, AppResult},
    ids::new_document_id,
    middleware::auth::{
        ADMIN_ROLE, CUSTOMER_ROLE, Identity, ensure_admin, ensure_customer, issue_token,
    },
    models::{Customer, CustomerStatus, Verification},
    notifications::Notification,
    response::{ApiResponse, Meta},
    state::AppState,
    store::StoreError,
};

const EMAIL_TAKEN: &str = "Email is already taken";
const CODE_PENDING: &str = "Already email sent or try again after 15 mins";
const INVALID_CODE: &str = "Invalid or expired verification code.";
const PASSWORD_MISMATCH: &str = "New password do not match";

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

pub async fn register(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<Customer>> {
    let RegisterRequest {
        email,
        password,
        first_name,
        last_name,
    } = payload;
    let email = email.trim().to_string();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".into()));
    }

    if state.store.find_customer_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest(EMAIL_TAKEN.into()));
    }

    let now = Utc::now();
    let customer = Customer {
        id: new_document_id(),
        first_name,
        last_name,
        avatar: None,
        email,
        phone_number: None,
        gender: None,
        dob: None,
        address: None,
        wishlist: Vec::new(),
        status: CustomerStatus::Active,
        password_hash: Some(hash_password(&password)?),
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .insert_customer(&customer)
        .await
        .map_err(|err| match err {
            StoreError::Duplicate(_) => AppError::BadRequest(EMAIL_TAKEN.into()),
            other => other.into(),
        })?;

    tracing::info!(customer_id = %customer.id, "customer registered");
    Ok(ApiResponse::success("Account created", customer, None))
}

/// Password login for customers. The caller is expected to drop any guest
/// `cart_id` cookie and re-issue it from [`LoginResponse::cart_id`].
pub async fn login(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;

    let customer = state
        .store
        .find_customer_by_email(&email)
        .await?
        .ok_or_else(|| AppError::BadRequest("Email not exist".into()))?;

    if customer.status == CustomerStatus::Suspended {
        return Err(AppError::BadRequest("Account suspended".into()));
    }
    let Some(password_hash) = customer.password_hash.as_deref() else {
        return Err(AppError::BadRequest("Login with google instead".into()));
    };
    if !verify_password(&password, password_hash)? {
        return Err(AppError::BadRequest("Incorrect password".into()));
    }

    let token = issue_token(&state.config.auth, &customer.id, CUSTOMER_ROLE)?;
    let cart_id = state
        .store
        .find_cart_by_owner(&customer.id)
        .await?
        .map(|cart| cart.id);

    tracing::info!(customer_id = %customer.id, "customer logged in");
    Ok(ApiResponse::success(
        "Login success",
        LoginResponse {
            token,
            role: CUSTOMER_ROLE.to_string(),
            cart_id,
        },
        Some(Meta::empty()),
    ))
}

pub async fn admin_login(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;

    let admin = state
        .store
        .find_admin_by_email(&email)
        .await?
        .ok_or_else(|| AppError::BadRequest("Email not exist".into()))?;

    if !verify_password(&password, &admin.password_hash)? {
        return Err(AppError::BadRequest("Incorrect password".into()));
    }

    let token = issue_token(&state.config.auth, &admin.id, ADMIN_ROLE)?;

    tracing::info!(admin_id = %admin.id, "admin logged in");
    Ok(ApiResponse::success(
        "Login success",
        LoginResponse {
            token,
            role: ADMIN_ROLE.to_string(),
            cart_id: None,
        },
        Some(Meta::empty()),
    ))
}

pub async fn send_verification_code(
    state: &AppState,
    payload: VerificationCodeRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let email = payload.email.trim().to_string();

    if state.store.find_verification(&email).await?.is_some() {
        return Err(AppError::BadRequest(CODE_PENDING.into()));
    }
    if state.store.find_customer_by_email(&email).await?.is_none() {
        return Err(AppError::BadRequest(
            "Please enter a valid registered email".into(),
        ));
    }

    let record = Verification {
        email: email.clone(),
        code: generate_code(),
        created_at: Utc::now(),
    };
    state
        .store
        .insert_verification(&record)
        .await
        .map_err(|err| match err {
            StoreError::Duplicate(_) => AppError::BadRequest(CODE_PENDING.into()),
            other => other.into(),
        })?;

    state
        .outbox
        .enqueue(Notification::verification_code(&email, &record.code));

    Ok(ApiResponse::success(
        "Verification code sent",
        serde_json::json!({ "email": email }),
        Some(Meta::empty()),
    ))
}

/// Resets a forgotten password with an emailed code. A wrong code leaves the
/// stored record in place so the customer can retry until it expires.
pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let email = payload.email.trim();

    let record = state
        .store
        .find_verification(email)
        .await?
        .filter(|record| record.code == payload.code)
        .ok_or_else(|| AppError::Unauthorized(INVALID_CODE.into()))?;

    if payload.password != payload.confirm_password {
        return Err(AppError::BadRequest(PASSWORD_MISMATCH.into()));
    }

    let password_hash = hash_password(&payload.password)?;
    if !state
        .store
        .set_password_by_email(email, &password_hash)
        .await?
    {
        return Err(AppError::NotFound("Customer not found".into()));
    }

    if !state
        .store
        .delete_verification(&record.email, &record.code)
        .await?
    {
        tracing::warn!(email, "verification record already gone after reset");
    }

    state.outbox.enqueue(Notification::password_changed(email));

    Ok(ApiResponse::success(
        "Password changed successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn change_password(
    state: &AppState,
    identity: &Identity,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let customer_id = ensure_customer(identity)?;

    if payload.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }
    if payload.password != payload.confirm_password {
        return Err(AppError::BadRequest(PASSWORD_MISMATCH.into()));
    }

    let customer = state
        .store
        .find_customer(customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer not found".into()))?;

    let password_hash = hash_password(&payload.password)?;
    if !state.store.set_password(&customer.id, &password_hash).await? {
        return Err(AppError::NotFound("Customer not found".into()));
    }

    state
        .outbox
        .enqueue(Notification::password_changed(&customer.email));

    Ok(ApiResponse::success(
        "Password changed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Admins may only change their own password; the session is ended so the
/// new password has to be used right away.
pub async fn change_admin_password(
    state: &AppState,
    identity: &Identity,
    payload: ChangeAdminPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let admin_id = ensure_admin(identity)?;

    if payload.new_password.is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }
    if payload.new_password != payload.confirm_new_password {
        return Err(AppError::BadRequest("Passwords do not match".into()));
    }

    let admin = state
        .store
        .find_admin_by_email(payload.email.trim())
        .await?
        .filter(|admin| admin.id == admin_id)
        .ok_or_else(|| AppError::NotFound("Admin not found".into()))?;

    let password_hash = hash_password(&payload.new_password)?;
    if !state.store.set_admin_password(&admin.id, &password_hash).await? {
        return Err(AppError::NotFound("Admin not found".into()));
    }

    tracing::info!(admin_id = %admin.id, "admin password changed");
    Ok(ApiResponse::success(
        "Password changed successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}
