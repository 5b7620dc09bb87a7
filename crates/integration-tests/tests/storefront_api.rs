//! Storefront API tests.
//!
//! Tests without `#[ignore]` run in-process against a lazy pool and never
//! reach the database. The ignored ones need `TEST_DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;
use tokio::sync::Barrier;
use uuid::Uuid;

use jerseyworks_core::pricing::{MAX_LINE_QUANTITY, MAX_UNIT_PRICE};
use jerseyworks_core::{Role, SizeDistribution};
use jerseyworks_integration_tests::{
    create_product, create_user, decimal, lazy_pool, request, send, storefront_app, test_pool,
};

fn club_prices() -> [Decimal; 3] {
    [Decimal::from(650), Decimal::from(600), Decimal::from(550)]
}

// ============================================================================
// No database
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = storefront_app(lazy_pool());
    let (status, _) = send(&app, request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_account_routes_require_token() {
    let app = storefront_app(lazy_pool());
    for uri in [
        "/api/cart",
        "/api/cart/count",
        "/api/account/orders",
        "/api/account/profile",
        "/api/me/roles/admin",
    ] {
        let (status, body) = send(&app, request(Method::GET, uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_checkout_requires_token() {
    let app = storefront_app(lazy_pool());
    let (status, _) = send(&app, request(Method::POST, "/api/checkout", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_quote_rejects_bad_quantity() {
    let app = storefront_app(lazy_pool());
    let uri = format!("/api/products/{}/quote?quantity=lots", Uuid::new_v4());
    let (status, _) = send(&app, request(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Database flows
// ============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_repeat_adds_merge_into_one_line() {
    let pool = test_pool().await;
    let user = create_user(&pool, &[Role::Customer]).await;
    let product = create_product(&pool, club_prices()).await;
    let app = storefront_app(pool);
    let token = Some(user.token.as_str());

    let add = |quantity: u32, customization: serde_json::Value| {
        json!({ "product_id": product, "quantity": quantity, "customization": customization })
    };

    let (status, first) = send(
        &app,
        request(Method::POST, "/api/cart", token, Some(add(60, json!({ "name": "ASHA" })))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, second) = send(
        &app,
        request(Method::POST, "/api/cart", token, Some(add(50, json!({ "number": 7 })))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["quantity"], 110);
    assert_eq!(second["customization"]["name"], "ASHA");
    assert_eq!(second["customization"]["number"], 7);
    let mut expected = SizeDistribution::default_for(60);
    expected.merge(&SizeDistribution::default_for(50));
    assert_eq!(second["size_distribution"], json!(expected));

    let (_, count) = send(&app, request(Method::GET, "/api/cart/count", token, None)).await;
    assert_eq!(count["count"], 1);

    let (status, cart) = send(&app, request(Method::GET, "/api/cart", token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["lines"][0]["tier"], "tier2");
    assert_eq!(decimal(&cart["subtotal"]), Decimal::from(66_000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_concurrent_adds_merge_into_one_line() {
    const ADDS: usize = 5;

    let pool = test_pool().await;
    let user = create_user(&pool, &[Role::Customer]).await;
    let product = create_product(&pool, club_prices()).await;
    let app = storefront_app(pool.clone());
    let barrier = Arc::new(Barrier::new(ADDS));

    let tasks: Vec<_> = (0..ADDS)
        .map(|_| {
            let app = app.clone();
            let token = user.token.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                let body = json!({ "product_id": product, "quantity": 10 });
                send(&app, request(Method::POST, "/api/cart", Some(&token), Some(body))).await
            })
        })
        .collect();
    for task in tasks {
        let (status, body) = task.await.unwrap();
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let rows: Vec<(i32, serde_json::Value)> = sqlx::query_as(
        "SELECT quantity, size_distribution FROM cart_items WHERE user_id = $1",
    )
    .bind(user.id)
    .fetch_all(&pool)
    .await
    .unwrap();

    let mut expected = SizeDistribution::default();
    for _ in 0..ADDS {
        expected.merge(&SizeDistribution::default_for(10));
    }
    assert_eq!(rows.len(), 1, "one line per product");
    assert_eq!(rows[0].0, 50);
    assert_eq!(rows[0].1, json!(expected));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_add_enforces_minimum_and_customization() {
    let pool = test_pool().await;
    let user = create_user(&pool, &[Role::Customer]).await;
    let product = create_product(&pool, club_prices()).await;
    let app = storefront_app(pool);
    let token = Some(user.token.as_str());

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/cart",
            token,
            Some(json!({ "product_id": product, "quantity": 5 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/cart",
            token,
            Some(json!({
                "product_id": product,
                "quantity": 20,
                "customization": { "logo": "crest.png" }
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("logo"));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_checkout_prices_order_and_empties_cart() {
    let pool = test_pool().await;
    let user = create_user(&pool, &[Role::Customer]).await;
    let stranger = create_user(&pool, &[Role::Customer]).await;
    let product = create_product(&pool, club_prices()).await;
    let app = storefront_app(pool);
    let token = Some(user.token.as_str());

    let (status, _) = send(&app, request(Method::POST, "/api/checkout", token, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "empty cart");

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/cart",
            token,
            Some(json!({ "product_id": product, "quantity": 150 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, order) = send(
        &app,
        request(
            Method::POST,
            "/api/checkout",
            token,
            Some(json!({ "notes": "Deliver to the club house" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(decimal(&order["total_amount"]), Decimal::from(90_000));
    assert_eq!(decimal(&order["booking_amount"]), Decimal::from(45_000));
    assert_eq!(decimal(&order["items"][0]["unit_price"]), Decimal::from(600));
    assert_eq!(order["status_history"].as_array().unwrap().len(), 1);

    let (_, count) = send(&app, request(Method::GET, "/api/cart/count", token, None)).await;
    assert_eq!(count["count"], 0);

    let uri = format!("/api/account/orders/{}", order["id"].as_str().unwrap());
    let (status, _) = send(&app, request(Method::GET, &uri, token, None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        request(Method::GET, &uri, Some(stranger.token.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_role_check() {
    let pool = test_pool().await;
    let customer = create_user(&pool, &[Role::Customer]).await;
    let app = storefront_app(pool);
    let token = Some(customer.token.as_str());

    let (status, body) = send(&app, request(Method::GET, "/api/me/roles/admin", token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_role"], false);

    let (status, _) = send(&app, request(Method::GET, "/api/me/roles/owner", token, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_checkout_keeps_line_added_while_it_runs() {
    let pool = test_pool().await;
    let user = create_user(&pool, &[Role::Customer]).await;
    let ordered = create_product(&pool, club_prices()).await;
    let late = create_product(&pool, club_prices()).await;
    let app = storefront_app(pool.clone());
    let token = Some(user.token.as_str());

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/cart",
            token,
            Some(json!({ "product_id": ordered, "quantity": 20 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Another session adds a line after checkout has priced the cart.
    let name = format!("late_cart_line_{}", Uuid::new_v4().simple());
    sqlx::query(&format!(
        "CREATE FUNCTION {name}() RETURNS trigger LANGUAGE plpgsql AS $$ \
         BEGIN \
             INSERT INTO cart_items (user_id, product_id, quantity, size_distribution) \
             VALUES (NEW.user_id, '{late}', 20, '{{\"S\":4,\"M\":4,\"L\":4,\"XL\":4,\"XXL\":4}}'); \
             RETURN NEW; \
         END $$"
    ))
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(&format!(
        "CREATE TRIGGER {name} AFTER INSERT ON orders FOR EACH ROW \
         WHEN (NEW.user_id = '{}') EXECUTE FUNCTION {name}()",
        user.id
    ))
    .execute(&pool)
    .await
    .unwrap();

    let (status, order) = send(&app, request(Method::POST, "/api/checkout", token, None)).await;

    sqlx::query(&format!("DROP TRIGGER {name} ON orders"))
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(&format!("DROP FUNCTION {name}()"))
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["items"].as_array().unwrap().len(), 1);

    let (_, cart) = send(&app, request(Method::GET, "/api/cart", token, None)).await;
    assert_eq!(cart["line_count"], 1);
    assert_eq!(cart["lines"][0]["product_id"], json!(late));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_line_and_order_totals_fit_money_columns() {
    let pool = test_pool().await;
    let user = create_user(&pool, &[Role::Customer]).await;
    let top = [MAX_UNIT_PRICE; 3];
    let first = create_product(&pool, top).await;
    let second = create_product(&pool, top).await;
    let app = storefront_app(pool);
    let token = Some(user.token.as_str());

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/cart",
            token,
            Some(json!({ "product_id": first, "quantity": 20_000_000 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at most"));

    let uri = format!("/api/products/{first}/quote?quantity=20000000");
    let (status, _) = send(&app, request(Method::GET, &uri, None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for product in [first, second] {
        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/cart",
                token,
                Some(json!({ "product_id": product, "quantity": MAX_LINE_QUANTITY })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Each line fits on its own; together they exceed the order total column.
    let (status, body) = send(&app, request(Method::POST, "/api/checkout", token, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (_, count) = send(&app, request(Method::GET, "/api/cart/count", token, None)).await;
    assert_eq!(count["count"], 2);
}
