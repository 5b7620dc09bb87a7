//! Product queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use jerseyworks_core::{CategoryId, CustomizationOptions, PriceTiers, ProductId};

use super::RepositoryError;
use crate::models::Product;

/// Columns selected for every product query, in `ProductRow` order.
pub(crate) const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.image_url, \
    p.tier1_price, p.tier2_price, p.tier3_price, \
    p.allow_name, p.allow_number, p.allow_logo, p.allow_custom_design, \
    p.is_popular, p.features, p.subcategory, p.category_id, p.created_at, p.updated_at";

/// Largest page the listing endpoint returns.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size when none is requested.
pub const DEFAULT_PAGE_SIZE: i64 = 24;

#[derive(sqlx::FromRow)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    image_url: Option<String>,
    tier1_price: Decimal,
    tier2_price: Decimal,
    tier3_price: Decimal,
    allow_name: bool,
    allow_number: bool,
    allow_logo: bool,
    allow_custom_design: bool,
    is_popular: bool,
    features: Vec<String>,
    subcategory: Option<String>,
    category_id: Option<CategoryId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            prices: PriceTiers {
                tier1: row.tier1_price,
                tier2: row.tier2_price,
                tier3: row.tier3_price,
            },
            customization: CustomizationOptions {
                allow_name: row.allow_name,
                allow_number: row.allow_number,
                allow_logo: row.allow_logo,
                allow_custom_design: row.allow_custom_design,
            },
            is_popular: row.is_popular,
            features: row.features,
            subcategory: row.subcategory,
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Most recently added first.
    #[default]
    Newest,
    /// Alphabetical.
    Name,
    /// Cheapest small-order price first.
    PriceAsc,
    /// Most expensive small-order price first.
    PriceDesc,
}

impl ProductSort {
    const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC, p.id",
            Self::Name => "LOWER(p.name) ASC, p.id",
            Self::PriceAsc => "p.tier1_price ASC, p.id",
            Self::PriceDesc => "p.tier1_price DESC, p.id",
        }
    }
}

/// Filters for the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    /// Matched case-insensitively against the product's subcategory.
    pub subcategory: Option<String>,
    /// Matched case-insensitively against name and description.
    pub search: Option<String>,
    pub popular_only: bool,
    pub sort: ProductSort,
    pub limit: i64,
    pub offset: i64,
}

/// Read-only access to products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE TRUE"));

        if let Some(category_id) = filter.category_id {
            query.push(" AND p.category_id = ").push_bind(category_id);
        }
        if let Some(subcategory) = &filter.subcategory {
            query
                .push(" AND LOWER(p.subcategory) = LOWER(")
                .push_bind(subcategory.clone())
                .push(")");
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", escape_like(search));
            query
                .push(" AND (p.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if filter.popular_only {
            query.push(" AND p.is_popular");
        }

        query
            .push(" ORDER BY ")
            .push(filter.sort.order_by())
            .push(" LIMIT ")
            .push_bind(filter.limit.clamp(1, MAX_PAGE_SIZE))
            .push(" OFFSET ")
            .push_bind(filter.offset.max(0));

        let rows = query
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like(" 100% cotton "), "100\\% cotton");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
        assert_eq!(escape_like("jersey"), "jersey");
    }

    #[test]
    fn test_sort_defaults_to_newest() {
        assert_eq!(ProductSort::default(), ProductSort::Newest);
        let sort: ProductSort = serde_json::from_str("\"price_desc\"").unwrap_or_default();
        assert_eq!(sort, ProductSort::PriceDesc);
    }
}
