//! Raw rows for the sales report. Aggregation lives in `services::reports`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use jerseyworks_core::{OrderId, OrderStatus, ProductId};

use super::RepositoryError;

/// Half-open creation-time window `[from, to)`; either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Whether the range is empty or inverted.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from >= to)
    }
}

/// The order fields the report needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportOrder {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One sold line.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportLine {
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i32,
    pub line_total: Decimal,
}

/// Loads report inputs.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders created inside `range`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self))]
    pub async fn orders(&self, range: DateRange) -> Result<Vec<ReportOrder>, RepositoryError> {
        let orders = sqlx::query_as::<_, ReportOrder>(
            "SELECT id, status, total_amount, paid_amount, created_at FROM orders \
             WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
               AND ($2::timestamptz IS NULL OR created_at < $2) \
             ORDER BY created_at",
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Lines of orders created inside `range`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self))]
    pub async fn lines(&self, range: DateRange) -> Result<Vec<ReportLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, ReportLine>(
            "SELECT i.order_id, i.product_id, i.product_name, i.quantity, i.line_total \
             FROM order_items i JOIN orders o ON o.id = i.order_id \
             WHERE ($1::timestamptz IS NULL OR o.created_at >= $1) \
               AND ($2::timestamptz IS NULL OR o.created_at < $2)",
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(self.pool)
        .await?;

        Ok(lines)
    }
}
