mod common;

use chrono::Utc;
use storefront_api::{
    dto::{
        auth::{
            ChangeAdminPasswordRequest, ChangePasswordRequest, LoginRequest, RegisterRequest,
            ResetPasswordRequest, VerificationCodeRequest,
        },
        customers::{UpdateCustomerRequest, WishlistRequest},
    },
    error::AppError,
    middleware::auth::{ADMIN_ROLE, CUSTOMER_ROLE, Identity, decode_token},
    models::{Admin, CustomerChanges, CustomerStatus, Verification},
    notifications::EmailTemplate,
    routes::params::{CustomerListQuery, Pagination},
    services::{auth_service, cart_service, customer_service},
    state::AppState,
};

use common::{ADMIN_ID, add_request, drain, insert_product, product, state};

const EMAIL: &str = "dana@example.com";
const PASSWORD: &str = "hunter22";

async fn register(state: &AppState) -> anyhow::Result<String> {
    let resp = auth_service::register(
        state,
        RegisterRequest {
            email: EMAIL.into(),
            password: PASSWORD.into(),
            first_name: Some("Dana".into()),
            last_name: None,
        },
    )
    .await?;
    Ok(resp.data.expect("customer").id)
}

fn login_request(password: &str) -> LoginRequest {
    LoginRequest {
        email: EMAIL.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn register_then_login_issues_customer_token() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let customer_id = register(&state).await?;

    let err = auth_service::register(
        &state,
        RegisterRequest {
            email: EMAIL.into(),
            password: "other".into(),
            first_name: None,
            last_name: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Email is already taken");

    let resp = auth_service::login(&state, login_request(PASSWORD)).await?;
    assert_eq!(resp.message, "Login success");
    let login = resp.data.expect("login");
    assert_eq!(login.role, CUSTOMER_ROLE);
    assert!(login.cart_id.is_none());

    let claims = decode_token(&state.config.auth, &login.token).expect("valid token");
    assert_eq!(claims.sub, customer_id);
    assert_eq!(claims.exp - claims.iat, 15 * 24 * 60 * 60);
    Ok(())
}

#[tokio::test]
async fn login_failures_are_reported_in_order() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let customer_id = register(&state).await?;

    let err = auth_service::login(
        &state,
        LoginRequest {
            email: "DANA@example.com".into(),
            password: PASSWORD.into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Email not exist");

    let err = auth_service::login(&state, login_request("wrong")).await.unwrap_err();
    assert_eq!(err.to_string(), "Incorrect password");

    state
        .store
        .update_customer(
            &customer_id,
            CustomerChanges {
                status: Some(CustomerStatus::Suspended),
                ..CustomerChanges::default()
            },
        )
        .await?;
    let err = auth_service::login(&state, login_request(PASSWORD)).await.unwrap_err();
    assert_eq!(err.to_string(), "Account suspended");
    Ok(())
}

#[tokio::test]
async fn passwordless_accounts_must_use_google() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let customer_id = register(&state).await?;
    let mut customer = state.store.find_customer(&customer_id).await?.expect("customer");
    customer.password_hash = None;
    customer.id = "f0f0f0f0f0f0f0f0f0f0f0f0".into();
    customer.email = "google@example.com".into();
    state.store.insert_customer(&customer).await?;

    let err = auth_service::login(
        &state,
        LoginRequest {
            email: "google@example.com".into(),
            password: "anything".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Login with google instead");
    Ok(())
}

#[tokio::test]
async fn login_reports_the_customers_existing_cart() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let customer_id = register(&state).await?;
    let tee = product("Tee", 3);
    insert_product(&state, &tee).await;

    let cart_id = cart_service::add_item(
        &state,
        &Identity::Customer(customer_id),
        add_request(None, &tee, None),
    )
    .await?
    .data
    .expect("cart")
    .id;

    let login = auth_service::login(&state, login_request(PASSWORD))
        .await?
        .data
        .expect("login");
    assert_eq!(login.cart_id.as_deref(), Some(cart_id.as_str()));
    Ok(())
}

async fn seed_admin(state: &AppState) -> anyhow::Result<()> {
    state
        .store
        .insert_admin(&Admin {
            id: ADMIN_ID.into(),
            name: "Owner".into(),
            email: "owner@example.com".into(),
            password_hash: auth_service::hash_password("root-pass")?,
            created_at: Utc::now(),
        })
        .await?;
    Ok(())
}

fn admin_login(password: &str) -> LoginRequest {
    LoginRequest {
        email: "owner@example.com".into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn admin_login_issues_admin_token() -> anyhow::Result<()> {
    let (state, _rx) = state();
    seed_admin(&state).await?;

    let login = auth_service::admin_login(&state, admin_login("root-pass"))
        .await?
    .data
    .expect("login");
    assert_eq!(login.role, ADMIN_ROLE);

    let claims = decode_token(&state.config.auth, &login.token).expect("valid token");
    assert_eq!(Identity::from_claims(claims), Identity::Admin(ADMIN_ID.into()));
    Ok(())
}

#[tokio::test]
async fn admins_change_only_their_own_password() -> anyhow::Result<()> {
    let (state, _rx) = state();
    seed_admin(&state).await?;
    let admin = Identity::Admin(ADMIN_ID.into());
    let request = |email: &str, new: &str, confirm: &str| ChangeAdminPasswordRequest {
        email: email.into(),
        new_password: new.into(),
        confirm_new_password: confirm.into(),
    };

    let customer = Identity::Customer("a1a1a1a1a1a1a1a1a1a1a1a1".into());
    let err = auth_service::change_admin_password(
        &state,
        &customer,
        request("owner@example.com", "new-pass", "new-pass"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = auth_service::change_admin_password(
        &state,
        &admin,
        request("owner@example.com", "new-pass", "other-pass"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Passwords do not match");

    let err = auth_service::change_admin_password(
        &state,
        &Identity::Admin("bbbbbbbbbbbbbbbbbbbbbbbb".into()),
        request("owner@example.com", "new-pass", "new-pass"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Admin not found");

    let resp = auth_service::change_admin_password(
        &state,
        &admin,
        request("owner@example.com", "new-pass", "new-pass"),
    )
    .await?;
    assert_eq!(resp.message, "Password changed successfully");

    let err = auth_service::admin_login(&state, admin_login("root-pass"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    auth_service::admin_login(&state, admin_login("new-pass")).await?;
    Ok(())
}

#[tokio::test]
async fn wrong_reset_code_leaves_the_record_untouched() -> anyhow::Result<()> {
    let (state, _rx) = state();
    register(&state).await?;
    state
        .store
        .insert_verification(&Verification {
            email: EMAIL.into(),
            code: "123456".into(),
            created_at: Utc::now(),
        })
        .await?;

    let err = auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            email: EMAIL.into(),
            code: "654321".into(),
            password: "new-pass".into(),
            confirm_password: "new-pass".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert_eq!(err.to_string(), "Invalid or expired verification code.");

    let record = state.store.find_verification(EMAIL).await?.expect("record kept");
    assert_eq!(record.code, "123456");

    let err = auth_service::login(&state, login_request("new-pass")).await.unwrap_err();
    assert_eq!(err.to_string(), "Incorrect password");
    Ok(())
}

#[tokio::test]
async fn verification_code_round_trip_resets_password() -> anyhow::Result<()> {
    let (state, mut rx) = state();
    register(&state).await?;

    let err = auth_service::send_verification_code(
        &state,
        VerificationCodeRequest {
            email: "nobody@example.com".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid registered email");

    let code_request = || VerificationCodeRequest {
        email: EMAIL.into(),
    };
    auth_service::send_verification_code(&state, code_request()).await?;
    let err = auth_service::send_verification_code(&state, code_request())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Already email sent or try again after 15 mins");

    let sent = drain(&mut rx);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].template, EmailTemplate::VerificationCode);
    let code = sent[0].params["verificationCode"]
        .as_str()
        .expect("code param")
        .to_string();
    assert_eq!(code.len(), 6);

    let err = auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            email: EMAIL.into(),
            code: code.clone(),
            password: "new-pass".into(),
            confirm_password: "typo".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            email: EMAIL.into(),
            code,
            password: "new-pass".into(),
            confirm_password: "new-pass".into(),
        },
    )
    .await?;

    assert!(state.store.find_verification(EMAIL).await?.is_none());
    assert!(auth_service::login(&state, login_request("new-pass")).await.is_ok());
    let sent = drain(&mut rx);
    assert_eq!(sent[0].template, EmailTemplate::PasswordChanged);
    Ok(())
}

#[tokio::test]
async fn customers_change_their_own_password() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let customer_id = register(&state).await?;
    let me = Identity::Customer(customer_id);

    let err = auth_service::change_password(
        &state,
        &Identity::Guest,
        ChangePasswordRequest {
            password: "x".into(),
            confirm_password: "x".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let resp = auth_service::change_password(
        &state,
        &me,
        ChangePasswordRequest {
            password: "brand-new".into(),
            confirm_password: "brand-new".into(),
        },
    )
    .await?;
    assert_eq!(resp.message, "Password changed");
    assert!(auth_service::login(&state, login_request("brand-new")).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn profiles_and_wishlists() -> anyhow::Result<()> {
    let (state, _rx) = state();
    let customer_id = register(&state).await?;
    let me = Identity::Customer(customer_id.clone());
    let admin = Identity::Admin(ADMIN_ID.into());

    let profile = customer_service::get_me(&state, &me).await?.data.expect("customer");
    assert_eq!(profile.email, EMAIL);

    let updated = customer_service::update_customer(
        &state,
        &me,
        UpdateCustomerRequest {
            last_name: Some("Buyer".into()),
            status: Some(CustomerStatus::Suspended),
            ..UpdateCustomerRequest::default()
        },
    )
    .await?
    .data
    .expect("customer");
    assert_eq!(updated.first_name.as_deref(), Some("Dana"));
    assert_eq!(updated.last_name.as_deref(), Some("Buyer"));
    assert_eq!(updated.status, CustomerStatus::Active);

    let err = customer_service::update_customer(&state, &admin, UpdateCustomerRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Customer ID is required.");

    let suspended = customer_service::update_customer(
        &state,
        &admin,
        UpdateCustomerRequest {
            customer_id: Some(customer_id.clone()),
            status: Some(CustomerStatus::Suspended),
            ..UpdateCustomerRequest::default()
        },
    )
    .await?
    .data
    .expect("customer");
    assert_eq!(suspended.status, CustomerStatus::Suspended);

    let listed = customer_service::list_customers(
        &state,
        &admin,
        Pagination::default(),
        CustomerListQuery {
            status: Some(CustomerStatus::Suspended),
        },
    )
    .await?;
    assert_eq!(listed.data.expect("list").items.len(), 1);
    assert!(customer_service::get_customer_by_id(&state, &me, &customer_id).await.is_err());

    let err = customer_service::wishlist_products(&state, &me).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let tee = product("Tee", 3);
    insert_product(&state, &tee).await;
    let wish = || WishlistRequest {
        product_id: tee.id.clone(),
    };
    let first = customer_service::add_to_wishlist(&state, &me, wish()).await?;
    assert_eq!(first.message, "Product added to wishlist");
    let again = customer_service::add_to_wishlist(&state, &me, wish()).await?;
    assert_eq!(again.message, "Product already in wishlist");

    let items = customer_service::wishlist_products(&state, &me)
        .await?
        .data
        .expect("list")
        .items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product.id, tee.id);
    assert!(items[0].reviews.is_empty());
    Ok(())
}
