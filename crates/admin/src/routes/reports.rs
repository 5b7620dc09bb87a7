//! Sales reports.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use tracing::instrument;

use crate::db::ReportRepository;
use crate::db::reports::DateRange;
use crate::error::{AppError, Result};
use crate::extract::ApiQuery;
use crate::middleware::RequireAdmin;
use crate::models::ReportSummary;
use crate::services::reports::summarize;
use crate::state::AppState;

/// Build the reports router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/reports/summary", get(summary))
}

/// Summary for orders created in `[from, to)`; either bound may be omitted.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn summary(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiQuery(range): ApiQuery<DateRange>,
) -> Result<Json<ReportSummary>> {
    if range.is_inverted() {
        return Err(AppError::BadRequest("from must be before to".to_owned()));
    }

    let repo = ReportRepository::new(state.pool());
    let orders = repo.orders(range).await?;
    let lines = repo.lines(range).await?;
    Ok(Json(summarize(range, &orders, &lines)))
}
