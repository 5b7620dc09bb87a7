//! User listing and role management.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tracing::instrument;

use jerseyworks_core::{Role, UnknownVariant, UserId};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::ApiPath;
use crate::middleware::RequireAdmin;
use crate::models::UserSummary;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list))
        .route("/api/users/{id}", get(show))
        .route("/api/users/{id}/roles/{role}", post(grant).delete(revoke))
}

/// Parse a role path segment.
pub(crate) fn parse_role(raw: &str) -> Result<Role> {
    raw.parse()
        .map_err(|e: UnknownVariant| AppError::BadRequest(e.to_string()))
}

/// Admins may not drop their own admin role and lock themselves out.
fn check_revoke(actor: UserId, target: UserId, role: Role) -> Result<()> {
    if actor == target && role == Role::Admin {
        return Err(AppError::Conflict(
            "cannot revoke your own admin role".to_owned(),
        ));
    }
    Ok(())
}

async fn load(state: &AppState, id: UserId) -> Result<UserSummary> {
    UserRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<UserSummary>>> {
    Ok(Json(UserRepository::new(state.pool()).list().await?))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<UserSummary>> {
    Ok(Json(load(&state, id).await?))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn grant(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath((id, role)): ApiPath<(UserId, String)>,
) -> Result<Json<UserSummary>> {
    let role = parse_role(&role)?;
    UserRepository::new(state.pool()).grant(id, role).await?;
    state.forget_admin_sessions();
    tracing::info!(user_id = %id, role = %role, "role granted");
    Ok(Json(load(&state, id).await?))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn revoke(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath((id, role)): ApiPath<(UserId, String)>,
) -> Result<Json<UserSummary>> {
    let role = parse_role(&role)?;
    check_revoke(admin.id, id, role)?;
    let removed = UserRepository::new(state.pool()).revoke(id, role).await?;
    if removed {
        state.forget_admin_sessions();
        tracing::info!(user_id = %id, role = %role, "role revoked");
    }
    Ok(Json(load(&state, id).await?))
}
