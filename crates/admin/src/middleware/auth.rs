//! Bearer-token guards for the admin API.
//!
//! Tokens are verified the same way as on the storefront: the SHA-256
//! digest of the presented token must match a live row in `auth_sessions`.
//! Admin lookups are then cached per digest for a short TTL.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use serde_json::json;

use jerseyworks_core::UserId;
use jerseyworks_core::token::{hash_token, parse_bearer};

use crate::db::SessionRepository;
use crate::db::sessions::SessionLookup;
use crate::error::set_sentry_user;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Extractor that requires a live session whose user holds the `admin` role.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Extractor that requires any live session, admin or not.
pub struct RequireUser(pub UserId);

/// Who is calling the order-status callback.
#[derive(Debug, Clone)]
pub enum CallbackCaller {
    /// A signed-in admin.
    Admin(CurrentAdmin),
    /// A service holding the shared callback secret.
    Service,
}

impl CallbackCaller {
    /// The user to credit in the status history, if any.
    #[must_use]
    pub fn actor(&self) -> Option<UserId> {
        match self {
            Self::Admin(admin) => Some(admin.id),
            Self::Service => None,
        }
    }
}

/// Error returned when a request fails the admin guard.
#[derive(Debug)]
pub enum AdminRejection {
    /// No usable `Authorization: Bearer` header.
    MissingToken,
    /// Token unknown or expired.
    InvalidToken,
    /// Valid session without the `admin` role.
    NotAdmin,
    /// The session lookup itself failed.
    Unavailable,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Missing bearer token"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            Self::NotAdmin => (StatusCode::FORBIDDEN, "Admin role required"),
            Self::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "Authentication unavailable"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn bearer(parts: &Parts) -> Result<&str, AdminRejection> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer)
        .ok_or(AdminRejection::MissingToken)
}

async fn lookup(state: &AppState, token_hash: &str) -> Result<SessionLookup, AdminRejection> {
    SessionRepository::new(state.pool())
        .lookup(token_hash)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "session lookup failed");
            AdminRejection::Unavailable
        })
}

/// Resolve a token to an admin, consulting the cache first.
async fn resolve_admin(state: &AppState, token: &str) -> Result<CurrentAdmin, AdminRejection> {
    let token_hash = hash_token(token);
    if let Some(admin) = state.admin_sessions().get(&token_hash).await {
        return Ok(admin);
    }

    match lookup(state, &token_hash).await? {
        SessionLookup::Admin(admin) => {
            state
                .admin_sessions()
                .insert(token_hash, admin.clone())
                .await;
            Ok(admin)
        }
        SessionLookup::NotAdmin(user_id) => {
            tracing::warn!(user_id = %user_id, "non-admin attempted admin access");
            Err(AdminRejection::NotAdmin)
        }
        SessionLookup::Unknown => Err(AdminRejection::InvalidToken),
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin = resolve_admin(state, bearer(parts)?).await?;
        set_sentry_user(&admin.id, Some(admin.email.as_str()));
        Ok(Self(admin))
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token_hash = hash_token(bearer(parts)?);
        if let Some(admin) = state.admin_sessions().get(&token_hash).await {
            return Ok(Self(admin.id));
        }
        match lookup(state, &token_hash).await? {
            SessionLookup::Admin(admin) => Ok(Self(admin.id)),
            SessionLookup::NotAdmin(user_id) => Ok(Self(user_id)),
            SessionLookup::Unknown => Err(AdminRejection::InvalidToken),
        }
    }
}

impl FromRequestParts<AppState> for CallbackCaller {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer(parts)?;
        if let Some(secret) = &state.config().callback_secret {
            if matches_secret(token, secret.expose_secret()) {
                return Ok(Self::Service);
            }
        }
        let admin = resolve_admin(state, token).await?;
        set_sentry_user(&admin.id, Some(admin.email.as_str()));
        Ok(Self::Admin(admin))
    }
}

/// Compare digests so the comparison time does not depend on the secret.
fn matches_secret(token: &str, secret: &str) -> bool {
    hash_token(token) == hash_token(secret)
}
