//! Product maintenance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use jerseyworks_core::{CategoryId, CustomizationOptions, PriceTiers, ProductId};

use super::{RepositoryError, map_constraint};
use crate::models::{Product, ProductInput};

const PRODUCT_COLUMNS: &str = "id, name, description, image_url, \
    tier1_price, tier2_price, tier3_price, \
    allow_name, allow_number, allow_logo, allow_custom_design, \
    is_popular, features, subcategory, category_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
#[allow(clippy::struct_excessive_bools)]
struct ProductRow {
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

/// Read-write access to products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every product, newest first. Filtering happens in memory.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// One product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Insert a product from validated input.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category does not exist.
    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (name, description, image_url, tier1_price, tier2_price, \
                                   tier3_price, allow_name, allow_number, allow_logo, \
                                   allow_custom_design, is_popular, features, subcategory, \
                                   category_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.image_url.as_deref())
        .bind(input.prices.tier1)
        .bind(input.prices.tier2)
        .bind(input.prices.tier3)
        .bind(input.customization.allow_name)
        .bind(input.customization.allow_number)
        .bind(input.customization.allow_logo)
        .bind(input.customization.allow_custom_design)
        .bind(input.is_popular)
        .bind(&input.features)
        .bind(input.subcategory.as_deref())
        .bind(input.category_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_constraint(e, "unknown category"))?;

        Ok(row.into())
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist and
    /// `RepositoryError::Conflict` if the category does not exist.
    #[tracing::instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products \
             SET name = $2, description = $3, image_url = $4, tier1_price = $5, \
                 tier2_price = $6, tier3_price = $7, allow_name = $8, allow_number = $9, \
                 allow_logo = $10, allow_custom_design = $11, is_popular = $12, \
                 features = $13, subcategory = $14, category_id = $15, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.image_url.as_deref())
        .bind(input.prices.tier1)
        .bind(input.prices.tier2)
        .bind(input.prices.tier3)
        .bind(input.customization.allow_name)
        .bind(input.customization.allow_number)
        .bind(input.customization.allow_logo)
        .bind(input.customization.allow_custom_design)
        .bind(input.is_popular)
        .bind(&input.features)
        .bind(input.subcategory.as_deref())
        .bind(input.category_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_constraint(e, "unknown category"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a product. Cart lines go with it; order items keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
