//! Sales report shapes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use jerseyworks_core::{OrderStatus, ProductId};

/// Aggregate figures for a date range.
///
/// Cancelled orders are counted but contribute no money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub order_count: u64,
    pub revenue: Decimal,
    pub collected: Decimal,
    pub outstanding: Decimal,
    pub average_order_value: Decimal,
    pub by_status: Vec<StatusCount>,
    pub revenue_by_month: Vec<MonthRevenue>,
    pub top_products: Vec<TopProduct>,
}

/// Number of orders in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

/// Revenue booked in one calendar month (`YYYY-MM`, UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthRevenue {
    pub month: String,
    pub order_count: u64,
    pub revenue: Decimal,
}

/// A best-selling product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopProduct {
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub units: u64,
    pub revenue: Decimal,
}
