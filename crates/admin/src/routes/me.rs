//! Role check for the signed-in user.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::Serialize;
use tracing::instrument;

use jerseyworks_core::Role;

use crate::db::SessionRepository;
use crate::error::Result;
use crate::extract::ApiPath;
use crate::middleware::RequireUser;
use crate::routes::users::parse_role;
use crate::state::AppState;

/// Build the router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/me/roles/{role}", get(has_role))
}

/// Response of `GET /api/me/roles/{role}`.
#[derive(Debug, Serialize)]
pub struct RoleCheck {
    pub role: Role,
    pub has_role: bool,
}

#[instrument(skip(state, user), fields(user_id = %user))]
async fn has_role(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(role): ApiPath<String>,
) -> Result<Json<RoleCheck>> {
    let role = parse_role(&role)?;
    let has_role = SessionRepository::new(state.pool())
        .has_role(user, role)
        .await?;
    Ok(Json(RoleCheck { role, has_role }))
}
