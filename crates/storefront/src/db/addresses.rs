//! Saved address queries.
//!
//! At most one address per user carries `is_default`. Setting the flag
//! clears it on the user's other addresses in the same transaction, and a
//! user's first address becomes the default automatically.

use sqlx::{PgConnection, PgPool};

use jerseyworks_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::{Address, AddressInput};
use crate::models::account::DEFAULT_COUNTRY;

const ADDRESS_COLUMNS: &str = "id, label, recipient_name, phone, line1, line2, city, state, \
    postal_code, country, is_default, created_at, updated_at";

/// Repository for a user's saved addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 \
             ORDER BY is_default DESC, created_at, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(addresses)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[tracing::instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        let is_default = input.is_default || existing == 0;
        if is_default {
            clear_default(&mut tx, user_id, None).await?;
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            "INSERT INTO addresses (user_id, label, recipient_name, phone, line1, line2, city, \
                                    state, postal_code, country, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(input.label.as_deref())
        .bind(&input.recipient_name)
        .bind(input.phone.as_deref())
        .bind(&input.line1)
        .bind(input.line2.as_deref())
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(input.country.as_deref().unwrap_or(DEFAULT_COUNTRY))
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Replace one of the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address is not the user's.
    #[tracing::instrument(skip(self, input), fields(user_id = %user_id, address_id = %id))]
    pub async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            clear_default(&mut tx, user_id, Some(id)).await?;
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            "UPDATE addresses \
             SET label = $3, recipient_name = $4, phone = $5, line1 = $6, line2 = $7, \
                 city = $8, state = $9, postal_code = $10, country = $11, is_default = $12, \
                 updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(input.label.as_deref())
        .bind(&input.recipient_name)
        .bind(input.phone.as_deref())
        .bind(&input.line1)
        .bind(input.line2.as_deref())
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(input.country.as_deref().unwrap_or(DEFAULT_COUNTRY))
        .bind(input.is_default)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }

    /// Delete one of the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address is not the user's.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, address_id = %id))]
    pub async fn delete(&self, user_id: UserId, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

async fn clear_default(
    conn: &mut PgConnection,
    user_id: UserId,
    except: Option<AddressId>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE addresses SET is_default = FALSE, updated_at = NOW() \
         WHERE user_id = $1 AND is_default AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(user_id)
    .bind(except)
    .execute(conn)
    .await?;
    Ok(())
}

/// Whether `id` is one of the user's addresses.
pub(crate) async fn belongs_to(
    conn: &mut PgConnection,
    user_id: UserId,
    id: AddressId,
) -> Result<bool, RepositoryError> {
    let found: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM addresses WHERE id = $1 AND user_id = $2)",
    )
    .bind(id)
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(found)
}
