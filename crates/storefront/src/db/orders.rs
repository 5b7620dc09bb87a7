//! Order queries and the checkout writes.
//!
//! Customers only ever see their own orders: every read filters on
//! `user_id`. The insert helpers take a connection so checkout can run
//! them inside its transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use jerseyworks_core::{
    AddressId, CartLine, Customization, OrderId, OrderItemId, OrderStatus, PaymentStatus,
    ProductId, SizeDistribution, UserId,
};

use super::{RepositoryError, quantity_from_db};
use crate::models::{Order, OrderDetail, OrderItem, PaymentRecord, StatusUpdate};

const ORDER_COLUMNS: &str = "id, user_id, total_amount, booking_amount, paid_amount, \
    payment_status, status, address_id, notes, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, product_id, product_name, quantity, unit_price, line_total, \
    size_distribution, customization, special_instructions, created_at";

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
    created_at: DateTime<Utc>,
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
            created_at: row.created_at,
        })
    }
}

/// Repository for a customer's orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// One of the user's orders with items, history and payments.
    ///
    /// Returns `None` when the order does not exist or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, order_id = %id))]
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        id: OrderId,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(order) = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let mut conn = self.pool.acquire().await?;
        load_detail(&mut conn, order).await.map(Some)
    }
}

/// Attach items, status history and payments to an order header.
pub(crate) async fn load_detail(
    conn: &mut PgConnection,
    order: Order,
) -> Result<OrderDetail, RepositoryError> {
    let items = sqlx::query_as::<_, OrderItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY created_at, id"
    ))
    .bind(order.id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(OrderItem::try_from)
    .collect::<Result<Vec<_>, _>>()?;

    let status_history = sqlx::query_as::<_, StatusUpdate>(
        "SELECT id, order_id, status, notes, created_by, created_at \
         FROM status_updates WHERE order_id = $1 ORDER BY created_at, id",
    )
    .bind(order.id)
    .fetch_all(&mut *conn)
    .await?;

    let payments = sqlx::query_as::<_, PaymentRecord>(
        "SELECT id, order_id, amount, method, reference, notes, created_at \
         FROM payment_records WHERE order_id = $1 ORDER BY created_at, id",
    )
    .bind(order.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(OrderDetail {
        balance_due: order.balance_due(),
        order,
        items,
        status_history,
        payments,
    })
}

/// Values for a new order header.
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub booking_amount: Decimal,
    pub address_id: Option<AddressId>,
    pub notes: Option<&'a str>,
}

/// Insert a pending, unpaid order.
pub(crate) async fn insert_order(
    conn: &mut PgConnection,
    order: &NewOrder<'_>,
) -> Result<Order, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "INSERT INTO orders (user_id, total_amount, booking_amount, paid_amount, \
                             payment_status, status, address_id, notes) \
         VALUES ($1, $2, $3, 0, $4, $5, $6, $7) \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order.user_id)
    .bind(order.total_amount)
    .bind(order.booking_amount)
    .bind(PaymentStatus::Unpaid)
    .bind(OrderStatus::Pending)
    .bind(order.address_id)
    .bind(order.notes)
    .fetch_one(conn)
    .await?;

    Ok(order)
}

/// Snapshot one priced cart line into `order_items`.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn insert_item(
    conn: &mut PgConnection,
    order_id: OrderId,
    product_id: ProductId,
    product_name: &str,
    line: &CartLine,
    unit_price: Decimal,
    line_total: Decimal,
) -> Result<(), RepositoryError> {
    let quantity = i32::try_from(line.quantity).map_err(|_| {
        RepositoryError::DataCorruption(format!("quantity {} out of range", line.quantity))
    })?;

    sqlx::query(
        "INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price, \
                                  line_total, size_distribution, customization, special_instructions) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(product_name)
    .bind(quantity)
    .bind(unit_price)
    .bind(line_total)
    .bind(Json(&line.size_distribution))
    .bind(Json(&line.customization))
    .bind(line.special_instructions.as_deref())
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
    let update = sqlx::query_as::<_, StatusUpdate>(
        "INSERT INTO status_updates (order_id, status, notes, created_by) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, order_id, status, notes, created_by, created_at",
    )
    .bind(order_id)
    .bind(status)
    .bind(notes)
    .bind(created_by)
    .fetch_one(conn)
    .await?;

    Ok(update)
}
