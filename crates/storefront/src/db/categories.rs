//! Category queries.

use sqlx::PgPool;

use jerseyworks_core::CategoryId;

use super::RepositoryError;
use crate::models::{Category, CategoryDetail};

const CATEGORY_COLUMNS: &str = "id, name, image_url, subcategories, created_at, updated_at";

/// Read-only access to categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY LOWER(name), id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// One category with its product count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(category_id = %id))]
    pub async fn get(&self, id: CategoryId) -> Result<Option<CategoryDetail>, RepositoryError> {
        let Some(category) = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(Some(CategoryDetail {
            category,
            product_count,
        }))
    }
}
