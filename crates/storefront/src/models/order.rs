//! Order models as seen by the customer who placed them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use jerseyworks_core::{
    AddressId, Customization, OrderId, OrderItemId, OrderStatus, PaymentRecordId, PaymentStatus,
    ProductId, SizeDistribution, StatusUpdateId, UserId,
};

/// An order header.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub booking_amount: Decimal,
    pub paid_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub address_id: Option<AddressId>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Amount still owed.
    #[must_use]
    pub fn balance_due(&self) -> Decimal {
        (self.total_amount - self.paid_amount).max(Decimal::ZERO)
    }
}

/// A priced snapshot of one cart line, frozen at checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub size_distribution: SizeDistribution,
    pub customization: Customization,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One entry in an order's status history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StatusUpdate {
    pub id: StatusUpdateId,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// A payment collected against an order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentRecord {
    pub id: PaymentRecordId,
    pub order_id: OrderId,
    pub amount: Decimal,
    pub method: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Order with its lines, history and payments.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub balance_due: Decimal,
    pub items: Vec<OrderItem>,
    pub status_history: Vec<StatusUpdate>,
    pub payments: Vec<PaymentRecord>,
}
