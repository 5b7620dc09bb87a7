//! Order reads and the fulfilment writes.
//!
//! The write helpers take a connection so the order service can run them
//! inside one transaction with the row locked.

use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use jerseyworks_core::{
    Customization, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId,
    SizeDistribution, UserId,
};

use super::{RepositoryError, quantity_from_db};
use crate::models::{AdminOrder, OrderDetail, OrderItem, PaymentRecord, StatusUpdate};

const ORDER_COLUMNS: &str = "o.id, o.user_id, p.email AS customer_email, o.total_amount, \
    o.booking_amount, o.paid_amount, o.payment_status, o.status, o.address_id, o.notes, \
    o.created_at, o.updated_at";

const ORDER_FROM: &str = "orders o JOIN profiles p ON p.id = o.user_id";

const STATUS_COLUMNS: &str = "id, order_id, status, notes, created_by, created_at";

const PAYMENT_COLUMNS: &str =
    "id, order_id, amount, method, reference, notes, recorded_by, created_at";

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    product_id: Option<ProductId>,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
    size_distribution: Json<SizeDistribution>,
    customization: Json<Customization>,
    special_instructions: Option<String>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: quantity_from_db(row.quantity)?,
            unit_price: row.unit_price,
            line_total: row.line_total,
            size_distribution: row.size_distribution.0,
            customization: row.customization.0,
            special_instructions: row.special_instructions,
        })
    }
}

/// Values for a new payment record.
#[derive(Debug, Clone)]
pub struct NewPayment<'a> {
    pub amount: Decimal,
    pub method: &'a str,
    pub reference: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub recorded_by: Option<UserId>,
}

/// Read access to every customer's orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every order, newest first. Filtering happens in memory.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        let orders = sqlx::query_as::<_, AdminOrder>(&format!(
            "SELECT {ORDER_COLUMNS} FROM {ORDER_FROM} ORDER BY o.created_at DESC, o.id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// One order with items, history and payments.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[tracing::instrument(skip(self), fields(order_id = %id))]
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let Some(order) = fetch_order(&mut conn, id, false).await? else {
            return Ok(None);
        };
        load_detail(&mut conn, order).await.map(Some)
    }
}

/// Fetch an order header, optionally locking the row for update.
pub(crate) async fn fetch_order(
    conn: &mut PgConnection,
    id: OrderId,
    lock: bool,
) -> Result<Option<AdminOrder>, RepositoryError> {
    let lock_clause = if lock { " FOR UPDATE OF o" } else { "" };
    let order = sqlx::query_as::<_, AdminOrder>(&format!(
        "SELECT {ORDER_COLUMNS} FROM {ORDER_FROM} WHERE o.id = $1{lock_clause}"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(order)
}

/// Attach items, status history and payments to an order header.
pub(crate) async fn load_detail(
    conn: &mut PgConnection,
    order: AdminOrder,
) -> Result<OrderDetail, RepositoryError> {
    let items = sqlx::query_as::<_, OrderItemRow>(
        "SELECT id, product_id, product_name, quantity, unit_price, line_total, \
                size_distribution, customization, special_instructions \
         FROM order_items WHERE order_id = $1 ORDER BY created_at, id",
    )
    .bind(order.id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(OrderItem::try_from)
    .collect::<Result<Vec<_>, _>>()?;

    let status_history = sqlx::query_as::<_, StatusUpdate>(&format!(
        "SELECT {STATUS_COLUMNS} FROM status_updates WHERE order_id = $1 ORDER BY created_at, id"
    ))
    .bind(order.id)
    .fetch_all(&mut *conn)
    .await?;

    let payments = sqlx::query_as::<_, PaymentRecord>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payment_records WHERE order_id = $1 ORDER BY created_at, id"
    ))
    .bind(order.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(OrderDetail {
        balance_due: order.balance_due(),
        next_statuses: order.status.next_states(),
        order,
        items,
        status_history,
        payments,
    })
}

/// Write a new fulfilment status.
pub(crate) async fn set_status(
    conn: &mut PgConnection,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(conn)
        .await?;
    Ok(())
}

/// Write the collected amount and its derived payment status.
pub(crate) async fn set_payment_totals(
    conn: &mut PgConnection,
    id: OrderId,
    paid_amount: Decimal,
    payment_status: PaymentStatus,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE orders SET paid_amount = $2, payment_status = $3, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(paid_amount)
    .bind(payment_status)
    .execute(conn)
    .await?;
    Ok(())
}

/// Append a row to an order's status history.
pub(crate) async fn insert_status_update(
    conn: &mut PgConnection,
    order_id: OrderId,
    status: OrderStatus,
    notes: Option<&str>,
    created_by: Option<UserId>,
) -> Result<StatusUpdate, RepositoryError> {
    let update = sqlx::query_as::<_, StatusUpdate>(&format!(
        "INSERT INTO status_updates (order_id, status, notes, created_by) \
         VALUES ($1, $2, $3, $4) RETURNING {STATUS_COLUMNS}"
    ))
    .bind(order_id)
    .bind(status)
    .bind(notes)
    .bind(created_by)
    .fetch_one(conn)
    .await?;

    Ok(update)
}

/// Append a payment record.
pub(crate) async fn insert_payment(
    conn: &mut PgConnection,
    order_id: OrderId,
    payment: &NewPayment<'_>,
) -> Result<PaymentRecord, RepositoryError> {
    let record = sqlx::query_as::<_, PaymentRecord>(&format!(
        "INSERT INTO payment_records (order_id, amount, method, reference, notes, recorded_by) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PAYMENT_COLUMNS}"
    ))
    .bind(order_id)
    .bind(payment.amount)
    .bind(payment.method)
    .bind(payment.reference)
    .bind(payment.notes)
    .bind(payment.recorded_by)
    .fetch_one(conn)
    .await?;

    Ok(record)
}

/// Sum of every payment recorded against an order.
pub(crate) async fn sum_payments(
    conn: &mut PgConnection,
    order_id: OrderId,
) -> Result<Decimal, RepositoryError> {
    let total: Option<Decimal> =
        sqlx::query_scalar("SELECT SUM(amount) FROM payment_records WHERE order_id = $1")
            .bind(order_id)
            .fetch_one(conn)
            .await?;
    Ok(total.unwrap_or(Decimal::ZERO))
}
