//! Catalog models: categories and products.

use chrono::{DateTime, Utc};
use serde::Serialize;

use jerseyworks_core::pricing::TierRow;
use jerseyworks_core::{CategoryId, CustomizationOptions, PriceTiers, ProductId};

/// A product category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub image_url: Option<String>,
    /// Free-text subcategory names shown as filters.
    pub subcategories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category together with how many products it holds.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}

/// A garment in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Per-unit prices by quantity bracket.
    pub prices: PriceTiers,
    /// Which customization keys a cart line may carry.
    #[serde(flatten)]
    pub customization: CustomizationOptions,
    pub is_popular: bool,
    pub features: Vec<String>,
    pub subcategory: Option<String>,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product page payload: the product and its price table.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub price_table: [TierRow; 3],
    /// Smallest quantity a cart line may hold.
    pub min_quantity: u32,
}

impl ProductDetail {
    /// Attach the price table to a product.
    #[must_use]
    pub fn new(product: Product, min_quantity: u32) -> Self {
        let price_table = product.prices.table();
        Self {
            product,
            price_table,
            min_quantity,
        }
    }
}
