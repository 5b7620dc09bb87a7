//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database ping)
//!
//! # Catalog (public)
//! GET  /api/categories                  - Category list
//! GET  /api/categories/{id}             - Category with product count
//! GET  /api/products                    - Filtered, sorted product list
//! GET  /api/products/{id}               - Product with price table
//! GET  /api/products/{id}/quote         - Price and default sizes for a quantity
//!
//! # Cart (bearer token)
//! GET    /api/cart                      - Priced cart
//! POST   /api/cart                      - Add or merge a line
//! DELETE /api/cart                      - Clear
//! GET    /api/cart/count                - Line count
//! PATCH  /api/cart/items/{id}           - Edit a line
//! DELETE /api/cart/items/{id}           - Remove a line
//!
//! # Checkout (bearer token)
//! POST /api/checkout                    - Turn the cart into an order
//!
//! # Account (bearer token)
//! GET/PUT    /api/account/profile
//! GET/POST   /api/account/addresses
//! PUT/DELETE /api/account/addresses/{id}
//! GET        /api/account/orders
//! GET        /api/account/orders/{id}
//! GET        /api/me/roles/{role}
//! ```

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;

use axum::{
    Router,
    extract::State,
    http::{
        HeaderValue, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{api_rate_limiter, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// All `/api` routes, rate limited per client IP.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .merge(cart::router())
        .merge(checkout::router())
        .merge(account::router())
        .layer(api_rate_limiter())
}

/// Build the full application: health checks, API and middleware.
///
/// Sentry layers are added by the binary so tests can run without them.
pub fn app(state: AppState) -> Router {
    let cors = state.config().allowed_origin.as_deref().and_then(cors_layer);

    let router = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        );

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };
    router.with_state(state)
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let Ok(origin) = HeaderValue::from_str(origin) else {
        tracing::warn!(origin, "ignoring unusable CORS origin");
        return None;
    };
    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
    )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;

    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/jerseyworks_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: url::Url::parse("http://localhost:3000").unwrap(),
            allowed_origin: Some("https://shop.example".to_owned()),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/jerseyworks_test")
            .unwrap();
        app(AppState::new(config, pool))
    }

    #[test]
    fn test_cors_layer_rejects_bad_origin() {
        assert!(cors_layer("https://shop.example").is_some());
        assert!(cors_layer("bad\norigin").is_none());
    }

    #[tokio::test]
    async fn test_health_sets_security_headers() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_cart_requires_bearer_token() {
        let response = test_app()
            .oneshot(
                Request::get("/api/cart")
                    .header("x-real-ip", "203.0.113.5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    async fn error_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_malformed_query_is_json_bad_request() {
        let response = test_app()
            .oneshot(
                Request::get("/api/products?limit=lots")
                    .header("x-real-ip", "203.0.113.5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Bad request"));
    }

    #[tokio::test]
    async fn test_malformed_path_is_json_bad_request() {
        let response = test_app()
            .oneshot(
                Request::get("/api/products/not-a-uuid/quote?quantity=20")
                    .header("x-real-ip", "203.0.113.5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_body(response).await["error"].is_string());
    }
}
