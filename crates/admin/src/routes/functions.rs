//! Callback endpoints invoked by external services.
//!
//! Responses use the `{"success": true, "data": ...}` envelope on success
//! and `{"error": "..."}` on failure.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use jerseyworks_core::{OrderId, OrderStatus};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::CallbackCaller;
use crate::models::StatusUpdate;
use crate::services::OrderService;
use crate::services::orders::StatusChange;
use crate::state::AppState;

/// Build the functions router.
pub fn router() -> Router<AppState> {
    Router::new().route("/functions/update-order-status", post(update_order_status))
}

/// Body of `POST /functions/update-order-status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatus {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub notes: Option<String>,
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Success<T> {
    const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[instrument(skip(state, caller, body))]
async fn update_order_status(
    State(state): State<AppState>,
    caller: CallbackCaller,
    ApiJson(body): ApiJson<UpdateOrderStatus>,
) -> Result<Json<Success<StatusUpdate>>> {
    let change = StatusChange {
        status: body.status,
        notes: body.notes,
    };
    let update = OrderService::new(state.pool())
        .change_status(body.order_id, &change, caller.actor())
        .await?;
    Ok(Json(Success::new(update)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_body_uses_camel_case() {
        let body: UpdateOrderStatus = serde_json::from_str(
            r#"{"orderId":"5f0c6a4e-2b1d-4c57-9d0a-3f2e1b7c8d90","status":"verified"}"#,
        )
        .unwrap();
        assert_eq!(body.status, OrderStatus::Verified);
        assert!(body.notes.is_none());
    }

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(Success::new(7)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 7 }));
    }
}
