//! Bearer-token authentication extractor.
//!
//! The identity provider issues opaque bearer tokens; this service only
//! verifies them. The SHA-256 digest of the presented token is looked up
//! in `auth_sessions`, and the session must not be expired.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use jerseyworks_core::token::{hash_token, parse_bearer};

use crate::db::SessionRepository;
use crate::error::set_sentry_user;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Error returned when a request cannot be authenticated.
#[derive(Debug)]
pub enum AuthRejection {
    /// No usable `Authorization: Bearer` header.
    MissingToken,
    /// Token unknown or expired.
    InvalidToken,
    /// The session lookup itself failed.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Missing bearer token"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            Self::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "Authentication unavailable"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer)
            .ok_or(AuthRejection::MissingToken)?;

        let user = SessionRepository::new(state.pool())
            .find_user(&hash_token(token))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "session lookup failed");
                AuthRejection::Unavailable
            })?
            .ok_or(AuthRejection::InvalidToken)?;

        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(user))
    }
}
