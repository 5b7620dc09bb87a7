//! Orders as the back office sees them: every customer, with contact email.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use jerseyworks_core::{
    AddressId, Customization, Email, OrderId, OrderItemId, OrderStatus, PaymentRecordId,
    PaymentStatus, ProductId, SizeDistribution, StatusUpdateId, UserId,
};

/// An order header joined with the customer's email.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminOrder {
    pub id: OrderId,
    pub user_id: UserId,
    pub customer_email: Email,
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

impl AdminOrder {
    /// Amount still owed.
    #[must_use]
    pub fn balance_due(&self) -> Decimal {
        (self.total_amount - self.paid_amount).max(Decimal::ZERO)
    }
}

/// A priced line frozen at checkout.
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
    pub recorded_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Full order view for the detail page.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: AdminOrder,
    pub balance_due: Decimal,
    /// Statuses the order may move to next.
    pub next_statuses: &'static [OrderStatus],
    pub items: Vec<OrderItem>,
    pub status_history: Vec<StatusUpdate>,
    pub payments: Vec<PaymentRecord>,
}
