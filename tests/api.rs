mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use storefront_api::{
    middleware::auth::{ADMIN_ROLE, CUSTOMER_ROLE, issue_token},
    routes::app_router,
    state::AppState,
};
use tower::ServiceExt;

use common::{ADMIN_ID, insert_product, product, state};

fn app(state: &AppState) -> Router {
    app_router().with_state(state.clone())
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn health_and_unknown_paths() {
    let (state, _rx) = state();

    let response = app(&state)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "ok");

    let response = app(&state)
        .oneshot(Request::get("/api/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["data"]["path"], "/api/nowhere");
}

#[tokio::test]
async fn adding_to_cart_sets_the_cart_cookie() {
    let (state, _rx) = state();
    let tee = product("Tee", 5);
    insert_product(&state, &tee).await;

    let response = app(&state)
        .oneshot(json_request(
            "POST",
            "/api/cart",
            json!({
                "product_id": tee.id,
                "name": tee.name,
                "images": [],
                "price": tee.sale_price,
                "tax": tee.tax,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("set-cookie")
        .to_string();
    let body = body_json(response).await;
    let cart_id = body["data"]["id"].as_str().expect("cart id");
    assert!(cookie.starts_with(&format!("cart_id={cart_id}")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Domain=shop.example.com"));
    assert!(body["data"].get("owner_id").is_none());

    let response = app(&state)
        .oneshot(
            Request::get("/api/cart")
                .header(header::COOKIE, format!("cart_id={cart_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["products"][0]["quantity"], 1);
}

#[tokio::test]
async fn admin_routes_check_the_role() {
    let (state, _rx) = state();
    let customer_token =
        issue_token(&state.config.auth, "a1a1a1a1a1a1a1a1a1a1a1a1", CUSTOMER_ROLE).unwrap();
    let admin_token = issue_token(&state.config.auth, ADMIN_ID, ADMIN_ROLE).unwrap();

    let response = app(&state)
        .oneshot(
            Request::get("/api/products/out-of-stock")
                .header(header::AUTHORIZATION, format!("Bearer {customer_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "Permission denied");

    let response = app(&state)
        .oneshot(
            Request::get("/api/products/out-of-stock")
                .header(header::COOKIE, format!("access_token={admin_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unconfigured_gateways_are_unavailable() {
    let (state, _rx) = state();

    let response = app(&state)
        .oneshot(json_request(
            "POST",
            "/api/payments/stripe",
            json!({
                "amount": 49.5,
                "shipping": {
                    "name": "Dana Buyer",
                    "address": {
                        "address1": "1 Main St",
                        "city": "Pune",
                        "state": "MH",
                        "postal_code": "411001",
                    },
                },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["message"], "Stripe is not configured");
}

#[tokio::test]
async fn oversized_pages_are_bad_requests() {
    let (state, _rx) = state();

    let response = app(&state)
        .oneshot(
            Request::get("/api/products?page=9223372036854775807&per_page=100")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "page is out of range");
}

#[tokio::test]
async fn newsletter_without_provider_is_unavailable() {
    let (state, _rx) = state();

    let response = app(&state)
        .oneshot(json_request(
            "POST",
            "/api/newsletter",
            json!({ "email": "dana@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["message"], "Newsletter is not configured");
}

#[tokio::test]
async fn dashboard_counts_need_a_known_model() {
    let (state, _rx) = state();
    let admin_token = issue_token(&state.config.auth, ADMIN_ID, ADMIN_ROLE).unwrap();
    insert_product(&state, &product("Tee", 5)).await;

    let response = app(&state)
        .oneshot(
            Request::get("/api/dashboard/count?model=products")
                .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["count"], 1);

    let response = app(&state)
        .oneshot(
            Request::get("/api/dashboard/count?model=coupons")
                .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
