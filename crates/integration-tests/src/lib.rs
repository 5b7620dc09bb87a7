//! Integration test support for Jerseyworks.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests and core properties (no database needed)
//! cargo test -p jerseyworks-integration-tests
//!
//! # Full flows against a scratch database (migrations are applied)
//! TEST_DATABASE_URL=postgres://localhost/jerseyworks_test \
//!     cargo test -p jerseyworks-integration-tests -- --ignored
//! ```
//!
//! Both routers are driven in-process with `tower::ServiceExt::oneshot`;
//! no listener is started. The live smoke tests in `tests/live_smoke.rs`
//! are the exception and talk to running binaries over HTTP.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use jerseyworks_core::token::hash_token;
use jerseyworks_core::{CategoryId, ProductId, Role, UserId};

/// Address handed to lazy pools; never dialled by tests that use them.
pub const LAZY_DATABASE_URL: &str = "postgres://localhost/jerseyworks_unused";

/// Client IP sent with every request so the storefront rate limiter has a key.
pub const TEST_CLIENT_IP: &str = "203.0.113.10";

/// A pool that only connects when a query runs.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy(LAZY_DATABASE_URL)
        .expect("lazy pool")
}

/// The storefront router over `pool`.
pub fn storefront_app(pool: PgPool) -> Router {
    let config = jerseyworks_storefront::config::StorefrontConfig {
        database_url: SecretString::from(LAZY_DATABASE_URL),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: url::Url::parse("http://localhost:3000").unwrap(),
        allowed_origin: None,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    jerseyworks_storefront::routes::app(jerseyworks_storefront::state::AppState::new(
        config, pool,
    ))
}

/// The admin router over `pool`, optionally accepting a callback secret.
pub fn admin_app(pool: PgPool, callback_secret: Option<&str>) -> Router {
    let config = jerseyworks_admin::config::AdminConfig {
        database_url: SecretString::from(LAZY_DATABASE_URL),
        host: "127.0.0.1".parse().unwrap(),
        port: 3001,
        callback_secret: callback_secret.map(SecretString::from),
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
        tls: None,
    };
    jerseyworks_admin::routes::app(jerseyworks_admin::state::AppState::new(config, pool))
}

/// Connect to `TEST_DATABASE_URL` and apply migrations.
///
/// # Panics
///
/// Panics when the variable is unset or the database is unusable; tests
/// calling this are `#[ignore]`d by default.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("apply migrations");
    pool
}

/// A profile with a live bearer token.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: UserId,
    pub token: String,
}

/// Insert a profile, its roles and a session valid for a day.
pub async fn create_user(pool: &PgPool, roles: &[Role]) -> TestUser {
    let id = UserId::new();
    let token = format!("test-{}", Uuid::new_v4());

    sqlx::query("INSERT INTO profiles (id, email, full_name) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(format!("{}@test.jerseyworks.shop", Uuid::new_v4().simple()))
        .bind("Test User")
        .execute(pool)
        .await
        .expect("insert profile");

    for role in roles {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(id)
            .bind(*role)
            .execute(pool)
            .await
            .expect("insert role");
    }

    sqlx::query(
        "INSERT INTO auth_sessions (token_hash, user_id, expires_at) \
         VALUES ($1, $2, NOW() + INTERVAL '1 day')",
    )
    .bind(hash_token(&token))
    .bind(id)
    .execute(pool)
    .await
    .expect("insert session");

    TestUser { id, token }
}

/// Insert a category and a product priced `tiers` in it.
pub async fn create_product(pool: &PgPool, tiers: [Decimal; 3]) -> ProductId {
    let category: CategoryId = sqlx::query_scalar(
        "INSERT INTO categories (name, subcategories) VALUES ($1, ARRAY['Cricket']) \
         RETURNING id",
    )
    .bind(format!("Teamwear {}", Uuid::new_v4().simple()))
    .fetch_one(pool)
    .await
    .expect("insert category");

    sqlx::query_scalar(
        "INSERT INTO products \
             (name, description, tier1_price, tier2_price, tier3_price, \
              allow_name, allow_number, subcategory, category_id) \
         VALUES ($1, 'Sublimated polyester', $2, $3, $4, TRUE, TRUE, 'Cricket', $5) \
         RETURNING id",
    )
    .bind(format!("Club Jersey {}", Uuid::new_v4().simple()))
    .bind(tiers[0])
    .bind(tiers[1])
    .bind(tiers[2])
    .bind(category)
    .fetch_one(pool)
    .await
    .expect("insert product")
}

/// Build a request with the test client IP and optional token and JSON body.
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-real-ip", TEST_CLIENT_IP);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON body (`Null` when empty or not JSON).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Parse a JSON decimal, which is serialized as a string.
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("expected a decimal string, got {value}"))
}
