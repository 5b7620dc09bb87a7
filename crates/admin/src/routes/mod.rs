//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database ping)
//!
//! # Catalog (admin)
//! GET/POST          /api/products
//! GET/PUT/DELETE    /api/products/{id}
//! GET/POST          /api/categories
//! GET/PUT/DELETE    /api/categories/{id}
//!
//! # Orders (admin)
//! GET  /api/orders                      - Filtered, sorted list
//! GET  /api/orders/{id}                 - Items, history, payments
//! POST /api/orders/{id}/status          - Status change
//! POST /api/orders/{id}/payments        - Record a payment
//!
//! # Users (admin)
//! GET         /api/users
//! GET         /api/users/{id}
//! POST/DELETE /api/users/{id}/roles/{role}
//!
//! # Settings and reports (admin)
//! GET /api/settings
//! PUT /api/settings/{key}
//! GET /api/reports/summary?from&to
//!
//! # Any signed-in user
//! GET /api/me/roles/{role}
//!
//! # Callbacks (admin bearer or shared secret)
//! POST /functions/update-order-status
//! ```

pub mod categories;
pub mod functions;
pub mod me;
pub mod orders;
pub mod products;
pub mod reports;
pub mod settings;
pub mod users;

use axum::{Router, extract::State, http::StatusCode, middleware::from_fn, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// All API and callback routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(products::router())
        .merge(categories::router())
        .merge(orders::router())
        .merge(users::router())
        .merge(settings::router())
        .merge(reports::router())
        .merge(me::router())
        .merge(functions::router())
}

/// Build the full application: health checks, API and middleware.
///
/// Sentry layers are added by the binary so tests can run without them.
pub fn app(state: AppState) -> Router {
    Router::new()
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
        )
        .with_state(state)
}

/// Liveness health check endpoint.
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
