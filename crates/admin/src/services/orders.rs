//! Order list filtering and the fulfilment transactions.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use jerseyworks_core::{OrderId, OrderStatus, PaymentStatus, TransitionError, UserId};

use crate::db::RepositoryError;
use crate::db::orders::{
    NewPayment, fetch_order, insert_payment, insert_status_update, set_payment_totals,
    set_status, sum_payments,
};
use crate::models::{AdminOrder, PaymentRecord, StatusUpdate};

// =============================================================================
// Listing
// =============================================================================

/// Sort order for the admin order list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSort {
    #[default]
    Newest,
    Oldest,
    TotalDesc,
    TotalAsc,
}

/// Query string of `GET /api/orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Case-insensitive match on the order ID or the customer's email.
    pub q: Option<String>,
    #[serde(default)]
    pub sort: OrderSort,
}

impl OrderQuery {
    /// Apply the filters and sort.
    #[must_use]
    pub fn apply(&self, orders: Vec<AdminOrder>) -> Vec<AdminOrder> {
        let needle = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let mut orders: Vec<AdminOrder> = orders
            .into_iter()
            .filter(|o| self.status.is_none_or(|s| o.status == s))
            .filter(|o| self.payment_status.is_none_or(|s| o.payment_status == s))
            .filter(|o| {
                needle.as_deref().is_none_or(|n| {
                    o.id.to_string().contains(n)
                        || o.customer_email.as_str().to_lowercase().contains(n)
                })
            })
            .collect();

        match self.sort {
            OrderSort::Newest => orders.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            OrderSort::Oldest => orders.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            OrderSort::TotalDesc => orders.sort_by(|a, b| b.total_amount.cmp(&a.total_amount)),
            OrderSort::TotalAsc => orders.sort_by(|a, b| a.total_amount.cmp(&b.total_amount)),
        }
        orders
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// Errors from status changes and payment recording.
#[derive(Debug, thiserror::Error)]
pub enum OrderServiceError {
    #[error("order not found")]
    NotFound,

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("invalid payment: {0}")]
    InvalidPayment(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderServiceError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Body of `POST /api/orders/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

/// Body of `POST /api/orders/{id}/payments`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInput {
    pub amount: Decimal,
    pub method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl PaymentInput {
    /// Check the amount and trim the text fields.
    ///
    /// # Errors
    ///
    /// Returns [`OrderServiceError::InvalidPayment`] for a non-positive
    /// amount, more than two decimal places or a blank method.
    pub fn normalized(self) -> Result<Self, OrderServiceError> {
        if self.amount <= Decimal::ZERO {
            return Err(OrderServiceError::InvalidPayment(
                "amount must be positive".to_owned(),
            ));
        }
        if self.amount.scale() > 2 && self.amount != self.amount.round_dp(2) {
            return Err(OrderServiceError::InvalidPayment(
                "amount has more than two decimal places".to_owned(),
            ));
        }
        let method = self.method.trim().to_owned();
        if method.is_empty() {
            return Err(OrderServiceError::InvalidPayment(
                "method is required".to_owned(),
            ));
        }
        Ok(Self {
            amount: self.amount,
            method,
            reference: trimmed(self.reference),
            notes: trimmed(self.notes),
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Runs the order-changing transactions.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Move an order to `change.status` and append a history row.
    ///
    /// The order row is locked for the duration, so concurrent changes
    /// serialize and each sees the other's result.
    ///
    /// # Errors
    ///
    /// Returns [`OrderServiceError::NotFound`] for an unknown order and
    /// [`OrderServiceError::Transition`] for a step the lifecycle forbids.
    #[tracing::instrument(skip(self, change), fields(order_id = %order_id, to = %change.status))]
    pub async fn change_status(
        &self,
        order_id: OrderId,
        change: &StatusChange,
        actor: Option<UserId>,
    ) -> Result<StatusUpdate, OrderServiceError> {
        let mut tx = self.pool.begin().await?;

        let order = fetch_order(&mut tx, order_id, true)
            .await?
            .ok_or(OrderServiceError::NotFound)?;
        let next = order.status.transition_with_payment(
            change.status,
            order.paid_amount,
            order.booking_amount,
        )?;

        set_status(&mut tx, order_id, next).await?;
        let notes = change.notes.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let update = insert_status_update(&mut tx, order_id, next, notes, actor).await?;

        tx.commit().await?;
        tracing::info!(from = %order.status, to = %next, "order status changed");
        Ok(update)
    }

    /// Record a payment and recompute the order's paid amount and status.
    ///
    /// # Errors
    ///
    /// Returns [`OrderServiceError::NotFound`] for an unknown order and
    /// [`OrderServiceError::InvalidPayment`] for a cancelled order or a
    /// payment that would exceed the total.
    #[tracing::instrument(skip(self, input), fields(order_id = %order_id, amount = %input.amount))]
    pub async fn record_payment(
        &self,
        order_id: OrderId,
        input: &PaymentInput,
        actor: Option<UserId>,
    ) -> Result<PaymentRecord, OrderServiceError> {
        let mut tx = self.pool.begin().await?;

        let order = fetch_order(&mut tx, order_id, true)
            .await?
            .ok_or(OrderServiceError::NotFound)?;
        check_payment(&order, input.amount)?;

        let record = insert_payment(
            &mut tx,
            order_id,
            &NewPayment {
                amount: input.amount,
                method: &input.method,
                reference: input.reference.as_deref(),
                notes: input.notes.as_deref(),
                recorded_by: actor,
            },
        )
        .await?;

        let paid = sum_payments(&mut tx, order_id).await?;
        let status = PaymentStatus::derive(paid, order.booking_amount, order.total_amount);
        set_payment_totals(&mut tx, order_id, paid, status).await?;

        tx.commit().await?;
        tracing::info!(paid = %paid, payment_status = %status, "payment recorded");
        Ok(record)
    }
}

/// Whether `amount` may be collected against `order`.
fn check_payment(order: &AdminOrder, amount: Decimal) -> Result<(), OrderServiceError> {
    if order.status == OrderStatus::Cancelled {
        return Err(OrderServiceError::InvalidPayment(
            "order is cancelled".to_owned(),
        ));
    }
    if order.paid_amount + amount > order.total_amount {
        return Err(OrderServiceError::InvalidPayment(format!(
            "amount exceeds balance due of {}",
            order.balance_due()
        )));
    }
    Ok(())
}
