//! Admin API tests.
//!
//! Tests without `#[ignore]` run in-process against a lazy pool. The
//! ignored ones need `TEST_DATABASE_URL` and drive the storefront and admin
//! routers over the same database.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use jerseyworks_core::Role;
use jerseyworks_integration_tests::{
    TestUser, admin_app, create_product, create_user, decimal, lazy_pool, request, send,
    storefront_app, test_pool,
};

const CALLBACK_SECRET: &str = "Zq8#mV2!rT6@wL9$kP3%xN7&bH5*cJ1^";

// ============================================================================
// No database
// ============================================================================

#[tokio::test]
async fn test_every_api_route_requires_token() {
    let app = admin_app(lazy_pool(), None);
    for uri in [
        "/api/products",
        "/api/categories",
        "/api/orders",
        "/api/users",
        "/api/settings",
        "/api/reports/summary",
        "/api/me/roles/admin",
    ] {
        let (status, body) = send(&app, request(Method::GET, uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_callback_with_secret_validates_body() {
    let app = admin_app(lazy_pool(), Some(CALLBACK_SECRET));
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/functions/update-order-status",
            Some(CALLBACK_SECRET),
            Some(json!({ "orderId": "not-a-uuid", "status": "verified" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_admin_responses_are_not_cached() {
    let app = admin_app(lazy_pool(), None);
    let response = tower::ServiceExt::oneshot(
        app,
        request(Method::GET, "/health", None, None),
    )
    .await
    .unwrap();
    assert_eq!(response.headers()["cache-control"], "no-store");
}

// ============================================================================
// Database flows
// ============================================================================

/// Place a 150-unit order at 650/600/550 and return its ID.
async fn place_order(storefront: &Router, customer: &TestUser, pool: &sqlx::PgPool) -> String {
    let product = create_product(
        pool,
        [Decimal::from(650), Decimal::from(600), Decimal::from(550)],
    )
    .await;
    let token = Some(customer.token.as_str());
    let (status, _) = send(
        storefront,
        request(
            Method::POST,
            "/api/cart",
            token,
            Some(json!({ "product_id": product, "quantity": 150 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, order) = send(storefront, request(Method::POST, "/api/checkout", token, None)).await;
    assert_eq!(status, StatusCode::CREATED);
    order["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_customer_is_forbidden() {
    let pool = test_pool().await;
    let customer = create_user(&pool, &[Role::Customer]).await;
    let app = admin_app(pool, None);

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/orders", Some(customer.token.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/me/roles/admin", Some(customer.token.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_role"], false);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_product_prices_must_fit_money_columns() {
    let pool = test_pool().await;
    let admin = create_user(&pool, &[Role::Admin]).await;
    let app = admin_app(pool, None);
    let token = Some(admin.token.as_str());

    let body = |tier1: &str| {
        json!({
            "name": "Cup Final Jersey",
            "prices": { "tier1": tier1, "tier2": "600", "tier3": "550" }
        })
    };

    for tier1 in ["650.555", "100000"] {
        let (status, body) = send(
            &app,
            request(Method::POST, "/api/products", token, Some(body(tier1))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{tier1}");
        assert!(body["error"].is_string());
    }

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/products", token, Some(body("650.50"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_fulfilment_flow() {
    let pool = test_pool().await;
    let customer = create_user(&pool, &[Role::Customer]).await;
    let admin = create_user(&pool, &[Role::Admin]).await;
    let storefront = storefront_app(pool.clone());
    let app = admin_app(pool.clone(), Some(CALLBACK_SECRET));
    let token = Some(admin.token.as_str());

    let order_id = place_order(&storefront, &customer, &pool).await;
    let status_uri = format!("/api/orders/{order_id}/status");
    let payments_uri = format!("/api/orders/{order_id}/payments");

    // Verification waits for the booking amount
    let (status, _) = send(
        &app,
        request(Method::POST, &status_uri, token, Some(json!({ "status": "verified" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, detail) = send(
        &app,
        request(
            Method::POST,
            &payments_uri,
            token,
            Some(json!({ "amount": "45000", "method": "upi", "reference": "UTR-1" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(detail["payment_status"], "booking_paid");
    assert_eq!(decimal(&detail["balance_due"]), Decimal::from(45_000));

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &payments_uri,
            token,
            Some(json!({ "amount": "50000", "method": "upi" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "overpayment");

    let (status, detail) = send(
        &app,
        request(
            Method::POST,
            &status_uri,
            token,
            Some(json!({ "status": "verified", "notes": "Artwork approved" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "verified");
    assert_eq!(detail["next_statuses"], json!(["production", "cancelled"]));

    // Callback with the shared secret records no actor
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/functions/update-order-status",
            Some(CALLBACK_SECRET),
            Some(json!({ "orderId": order_id, "status": "production" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "production");
    assert_eq!(body["data"]["created_by"], Value::Null);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/functions/update-order-status",
            token,
            Some(json!({ "orderId": order_id, "status": "pending" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (_, detail) = send(
        &app,
        request(Method::GET, &format!("/api/orders/{order_id}"), token, None),
    )
    .await;
    assert_eq!(detail["status_history"].as_array().unwrap().len(), 3);
    assert_eq!(detail["payments"].as_array().unwrap().len(), 1);

    let (status, orders) = send(
        &app,
        request(Method::GET, &format!("/api/orders?q={order_id}"), token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_role_grants_take_effect_immediately() {
    let pool = test_pool().await;
    let admin = create_user(&pool, &[Role::Admin]).await;
    let colleague = create_user(&pool, &[Role::Customer]).await;
    let app = admin_app(pool, None);
    let token = Some(admin.token.as_str());

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/orders", Some(colleague.token.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let grant_uri = format!("/api/users/{}/roles/admin", colleague.id);
    let (status, user) = send(&app, request(Method::POST, &grant_uri, token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["roles"], json!(["admin", "customer"]));

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/orders", Some(colleague.token.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, request(Method::DELETE, &grant_uri, token, None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        request(Method::GET, "/api/orders", Some(colleague.token.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let own_uri = format!("/api/users/{}/roles/admin", admin.id);
    let (status, _) = send(&app, request(Method::DELETE, &own_uri, token, None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_settings_and_reports() {
    let pool = test_pool().await;
    let admin = create_user(&pool, &[Role::Admin]).await;
    let app = admin_app(pool, None);
    let token = Some(admin.token.as_str());

    let (status, body) = send(&app, request(Method::GET, "/api/settings", token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["effective"]["booking_percent"].is_u64());

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/settings/booking_percent",
            token,
            Some(json!({ "value": 150 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            "/api/settings/booking_percent",
            token,
            Some(json!({ "value": 0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "zero booking would skip payment");
    assert!(body["error"].as_str().unwrap().contains("1 to 100"));

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            "/api/reports/summary?from=2026-01-01T00:00:00Z&to=2100-01-01T00:00:00Z",
            token,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["by_status"].as_array().unwrap().len(), 7);

    let (status, _) = send(
        &app,
        request(
            Method::GET,
            "/api/reports/summary?from=2026-06-01T00:00:00Z&to=2026-01-01T00:00:00Z",
            token,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
