//! Cart models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use jerseyworks_core::{CartItemId, CartLine, CustomizationOptions, PriceTiers, ProductId, Tier};

/// One stored cart line.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    /// Quantity, sizes, customization and instructions.
    #[serde(flatten)]
    pub line: CartLine,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with the product data needed to price it.
#[derive(Debug, Clone)]
pub struct CartEntry {
    pub item: CartItem,
    pub product_name: String,
    pub image_url: Option<String>,
    pub prices: PriceTiers,
    pub options: CustomizationOptions,
}

/// A cart line with its current price.
#[derive(Debug, Clone, Serialize)]
pub struct PricedCartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub product_name: String,
    pub image_url: Option<String>,
    pub tier: Tier,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// The whole cart as returned by `GET /api/cart`.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<PricedCartLine>,
    /// Number of distinct products.
    pub line_count: usize,
    /// Garments across all lines.
    pub total_quantity: u64,
    pub subtotal: Decimal,
}
