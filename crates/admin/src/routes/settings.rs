//! Store settings.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::instrument;

use crate::db::SettingsRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdmin;
use crate::models::settings::validate;
use crate::models::{SettingEntry, StoreSettings};
use crate::state::AppState;

const MAX_KEY_LEN: usize = 64;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/settings", get(list))
        .route("/api/settings/{key}", put(upsert))
}

/// Response of `GET /api/settings`.
#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub entries: Vec<SettingEntry>,
    /// Known settings with defaults filled in.
    pub effective: StoreSettings,
}

/// Body of `PUT /api/settings/{key}`.
#[derive(Debug, Deserialize)]
pub struct SettingValue {
    pub value: JsonValue,
}

/// Keys are short `snake_case` identifiers.
fn check_key(key: &str) -> Result<()> {
    let ok = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("invalid setting key {key:?}")))
    }
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<SettingsView>> {
    let entries = SettingsRepository::new(state.pool()).list().await?;
    let effective = StoreSettings::from_entries(&entries);
    Ok(Json(SettingsView { entries, effective }))
}

#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
async fn upsert(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(key): ApiPath<String>,
    ApiJson(body): ApiJson<SettingValue>,
) -> Result<Json<SettingEntry>> {
    check_key(&key)?;
    validate(&key, &body.value)?;
    let entry = SettingsRepository::new(state.pool())
        .upsert(&key, &body.value)
        .await?;
    tracing::info!(key = %entry.key, "setting updated");
    Ok(Json(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_key() {
        assert!(check_key("booking_percent").is_ok());
        assert!(check_key("banner_2").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("Booking-Percent").is_err());
        assert!(check_key(&"k".repeat(MAX_KEY_LEN + 1)).is_err());
    }
}
