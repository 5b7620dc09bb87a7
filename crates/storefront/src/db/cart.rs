//! Cart persistence.
//!
//! `cart_items` has a unique `(user_id, product_id)` constraint. Adding a
//! product that is already in the cart merges into the existing row inside
//! one transaction, so concurrent adds never produce a second line.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use jerseyworks_core::{
    CartError, CartItemId, CartLine, Customization, CustomizationOptions, PriceTiers, ProductId,
    SizeDistribution, UserId,
};

use super::{RepositoryError, quantity_from_db};
use crate::models::{CartEntry, CartItem};

const CART_COLUMNS: &str = "c.id, c.product_id, c.quantity, c.size_distribution, \
    c.customization, c.special_instructions, c.created_at, c.updated_at";

const ENTRY_COLUMNS: &str = "c.id, c.product_id, c.quantity, c.size_distribution, \
    c.customization, c.special_instructions, c.created_at, c.updated_at, \
    p.name AS product_name, p.image_url, p.tier1_price, p.tier2_price, p.tier3_price, \
    p.allow_name, p.allow_number, p.allow_logo, p.allow_custom_design";

/// Errors from cart writes.
#[derive(Debug, Error)]
pub enum CartWriteError {
    /// The database rejected or failed the write.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// The merged line breaks a cart rule.
    #[error(transparent)]
    Cart(#[from] CartError),
}

impl From<sqlx::Error> for CartWriteError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartItemId,
    product_id: ProductId,
    quantity: i32,
    size_distribution: Json<SizeDistribution>,
    customization: Json<Customization>,
    special_instructions: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            line: CartLine {
                quantity: quantity_from_db(row.quantity)?,
                size_distribution: row.size_distribution.0,
                customization: row.customization.0,
                special_instructions: row.special_instructions,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
#[allow(clippy::struct_excessive_bools)]
struct EntryRow {
    #[sqlx(flatten)]
    cart: CartRow,
    product_name: String,
    image_url: Option<String>,
    tier1_price: Decimal,
    tier2_price: Decimal,
    tier3_price: Decimal,
    allow_name: bool,
    allow_number: bool,
    allow_logo: bool,
    allow_custom_design: bool,
}

impl TryFrom<EntryRow> for CartEntry {
    type Error = RepositoryError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            item: row.cart.try_into()?,
            product_name: row.product_name,
            image_url: row.image_url,
            prices: PriceTiers {
                tier1: row.tier1_price,
                tier2: row.tier2_price,
                tier3: row.tier3_price,
            },
            options: CustomizationOptions {
                allow_name: row.allow_name,
                allow_number: row.allow_number,
                allow_logo: row.allow_logo,
                allow_custom_design: row.allow_custom_design,
            },
        })
    }
}

fn quantity_to_db(quantity: u32) -> Result<i32, CartError> {
    i32::try_from(quantity).map_err(|_| CartError::Overflow)
}

/// Repository for the signed-in user's cart.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every line in the user's cart with the product data needed for pricing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails and
    /// `RepositoryError::DataCorruption` for an unreadable row.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn entries(&self, user_id: UserId) -> Result<Vec<CartEntry>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        load_entries(&mut conn, user_id, false).await
    }

    /// Number of lines in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Get one of the user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, item_id = %id))]
    pub async fn get(
        &self,
        user_id: UserId,
        id: CartItemId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM cart_items c WHERE c.id = $1 AND c.user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(CartItem::try_from).transpose()
    }

    /// Add `incoming` for `product_id`, merging into an existing line.
    ///
    /// Runs in a single transaction:
    /// 1. Lock the existing `(user, product)` row, if any.
    /// 2. If absent, insert; `ON CONFLICT DO NOTHING` covers a concurrent insert.
    /// 3. If the insert lost that race, lock the winner's row and merge.
    ///
    /// # Errors
    ///
    /// Returns `CartWriteError::Cart` if the merged quantity does not fit and
    /// `CartWriteError::Repository` for database failures.
    #[tracing::instrument(skip(self, incoming), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        incoming: &CartLine,
    ) -> Result<CartItem, CartWriteError> {
        let mut tx = self.pool.begin().await?;

        let row = match lock_line(&mut tx, user_id, product_id).await? {
            Some(existing) => merge_into(&mut tx, existing, incoming).await?,
            None => {
                let inserted = sqlx::query_as::<_, CartRow>(&format!(
                    "INSERT INTO cart_items AS c \
                         (user_id, product_id, quantity, size_distribution, customization, special_instructions) \
                     VALUES ($1, $2, $3, $4, $5, $6) \
                     ON CONFLICT (user_id, product_id) DO NOTHING \
                     RETURNING {CART_COLUMNS}"
                ))
                .bind(user_id)
                .bind(product_id)
                .bind(quantity_to_db(incoming.quantity)?)
                .bind(Json(&incoming.size_distribution))
                .bind(Json(&incoming.customization))
                .bind(incoming.special_instructions.as_deref())
                .fetch_optional(&mut *tx)
                .await?;

                match inserted {
                    Some(row) => row,
                    None => {
                        tracing::debug!("concurrent add won the insert, merging");
                        let existing = lock_line(&mut tx, user_id, product_id)
                            .await?
                            .ok_or(RepositoryError::NotFound)?;
                        merge_into(&mut tx, existing, incoming).await?
                    }
                }
            }
        };

        tx.commit().await?;
        Ok(row.try_into()?)
    }

    /// Overwrite the mergeable content of one line.
    ///
    /// # Errors
    ///
    /// Returns `CartWriteError::Repository(NotFound)` if the line is not the
    /// user's, `CartWriteError::Cart` for an out-of-range quantity.
    #[tracing::instrument(skip(self, line), fields(user_id = %user_id, item_id = %id))]
    pub async fn replace(
        &self,
        user_id: UserId,
        id: CartItemId,
        line: &CartLine,
    ) -> Result<CartItem, CartWriteError> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "UPDATE cart_items AS c \
             SET quantity = $3, size_distribution = $4, customization = $5, \
                 special_instructions = $6, updated_at = NOW() \
             WHERE c.id = $1 AND c.user_id = $2 \
             RETURNING {CART_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(quantity_to_db(line.quantity)?)
        .bind(Json(&line.size_distribution))
        .bind(Json(&line.customization))
        .bind(line.special_instructions.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.try_into()?)
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not the user's.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, item_id = %id))]
    pub async fn remove(&self, user_id: UserId, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Empty the cart. Returns how many lines were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        clear(&mut conn, user_id).await
    }
}

async fn lock_line(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
) -> Result<Option<CartRow>, sqlx::Error> {
    sqlx::query_as::<_, CartRow>(&format!(
        "SELECT {CART_COLUMNS} FROM cart_items c \
         WHERE c.user_id = $1 AND c.product_id = $2 \
         FOR UPDATE"
    ))
    .bind(user_id)
    .bind(product_id)
    .fetch_optional(conn)
    .await
}

async fn merge_into(
    conn: &mut PgConnection,
    existing: CartRow,
    incoming: &CartLine,
) -> Result<CartRow, CartWriteError> {
    let id = existing.id;
    let mut line = CartItem::try_from(existing)?.line;
    line.absorb(incoming)?;

    let row = sqlx::query_as::<_, CartRow>(&format!(
        "UPDATE cart_items AS c \
         SET quantity = $2, size_distribution = $3, customization = $4, \
             special_instructions = $5, updated_at = NOW() \
         WHERE c.id = $1 \
         RETURNING {CART_COLUMNS}"
    ))
    .bind(id)
    .bind(quantity_to_db(line.quantity)?)
    .bind(Json(&line.size_distribution))
    .bind(Json(&line.customization))
    .bind(line.special_instructions.as_deref())
    .fetch_one(conn)
    .await?;

    Ok(row)
}

/// Load the user's cart lines joined with their products.
///
/// With `lock` set the cart rows are locked `FOR UPDATE` until the
/// surrounding transaction ends.
pub(crate) async fn load_entries(
    conn: &mut PgConnection,
    user_id: UserId,
    lock: bool,
) -> Result<Vec<CartEntry>, RepositoryError> {
    let suffix = if lock { " FOR UPDATE OF c" } else { "" };
    let rows = sqlx::query_as::<_, EntryRow>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM cart_items c \
         JOIN products p ON p.id = c.product_id \
         WHERE c.user_id = $1 \
         ORDER BY c.created_at, c.id{suffix}"
    ))
    .bind(user_id)
    .fetch_all(conn)
    .await?;

    rows.into_iter().map(CartEntry::try_from).collect()
}

/// Delete the listed lines from the user's cart.
///
/// Lines not in `ids` are kept, including any added after `ids` was read.
pub(crate) async fn remove_lines(
    conn: &mut PgConnection,
    user_id: UserId,
    ids: &[CartItemId],
) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND id = ANY($2)")
        .bind(user_id)
        .bind(ids)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Delete every cart line the user holds.
pub(crate) async fn clear(conn: &mut PgConnection, user_id: UserId) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
