//! Account routes: profile, saved addresses, order history and role checks.
//!
//! Every query is scoped to the caller, so one customer can never read or
//! change another customer's rows.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use jerseyworks_core::{AddressId, OrderId, Role};

use crate::db::{AddressRepository, OrderRepository, ProfileRepository, SessionRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireUser;
use crate::models::{Address, AddressInput, Order, OrderDetail, Profile};
use crate::state::AppState;

/// Longest accepted profile name or phone.
const MAX_PROFILE_FIELD: usize = 200;

/// Build the account router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/account/profile", get(show_profile).put(update_profile))
        .route(
            "/api/account/addresses",
            get(list_addresses).post(create_address),
        )
        .route(
            "/api/account/addresses/{id}",
            put(update_address).delete(delete_address),
        )
        .route("/api/account/orders", get(list_orders))
        .route("/api/account/orders/{id}", get(show_order))
        .route("/api/me/roles/{role}", get(has_role))
}

/// Body of `PUT /api/account/profile`. Blank strings clear the field.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

/// Response of `GET /api/me/roles/{role}`.
#[derive(Debug, Serialize)]
pub struct RoleCheck {
    pub role: Role,
    pub has_role: bool,
}

fn clean_field(value: Option<String>, field: &str) -> Result<Option<String>> {
    let value = value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
    if value.as_ref().is_some_and(|v| v.chars().count() > MAX_PROFILE_FIELD) {
        return Err(AppError::BadRequest(format!("{field} is too long")));
    }
    Ok(value)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn show_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Profile>> {
    let profile = ProfileRepository::new(state.pool())
        .get(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("profile".to_owned()))?;
    Ok(Json(profile))
}

#[instrument(skip(state, user, update), fields(user_id = %user.id))]
async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<Profile>> {
    let full_name = clean_field(update.full_name, "full_name")?;
    let phone = clean_field(update.phone, "phone")?;

    let profile = ProfileRepository::new(state.pool())
        .update(user.id, full_name.as_deref(), phone.as_deref())
        .await?;
    Ok(Json(profile))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn list_addresses(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(addresses))
}

#[instrument(skip(state, user, input), fields(user_id = %user.id))]
async fn create_address(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(input): ApiJson<AddressInput>,
) -> Result<(StatusCode, Json<Address>)> {
    let input = input
        .normalized()
        .map_err(|field| AppError::BadRequest(format!("{field} is required")))?;
    let address = AddressRepository::new(state.pool())
        .create(user.id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

#[instrument(skip(state, user, input), fields(user_id = %user.id))]
async fn update_address(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(id): ApiPath<AddressId>,
    ApiJson(input): ApiJson<AddressInput>,
) -> Result<Json<Address>> {
    let input = input
        .normalized()
        .map_err(|field| AppError::BadRequest(format!("{field} is required")))?;
    let address = AddressRepository::new(state.pool())
        .update(user.id, id, &input)
        .await?;
    Ok(Json(address))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn delete_address(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(id): ApiPath<AddressId>,
) -> Result<StatusCode> {
    AddressRepository::new(state.pool()).delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn list_orders(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn show_order(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderDetail>> {
    let order = OrderRepository::new(state.pool())
        .get_for_user(user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
async fn has_role(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(role): ApiPath<String>,
) -> Result<Json<RoleCheck>> {
    let role: Role = role
        .parse()
        .map_err(|e: jerseyworks_core::UnknownVariant| AppError::BadRequest(e.to_string()))?;
    let has_role = SessionRepository::new(state.pool())
        .has_role(user.id, role)
        .await?;
    Ok(Json(RoleCheck { role, has_role }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_field_blank_clears() {
        assert_eq!(clean_field(Some("   ".into()), "phone").unwrap(), None);
        assert_eq!(
            clean_field(Some(" Asha ".into()), "full_name").unwrap(),
            Some("Asha".to_owned())
        );
        assert_eq!(clean_field(None, "phone").unwrap(), None);
    }

    #[test]
    fn test_clean_field_rejects_long_values() {
        let long = "x".repeat(MAX_PROFILE_FIELD + 1);
        assert!(matches!(
            clean_field(Some(long), "full_name"),
            Err(AppError::BadRequest(_))
        ));
    }
}
