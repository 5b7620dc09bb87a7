//! Profiles and role grants.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use jerseyworks_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::UserSummary;

const USER_SELECT: &str = "SELECT p.id, p.email, p.full_name, p.phone, p.created_at, \
        COALESCE(ARRAY_AGG(r.role ORDER BY r.role) FILTER (WHERE r.role IS NOT NULL), '{}') \
            AS roles, \
        (SELECT COUNT(*) FROM orders o WHERE o.user_id = p.id) AS order_count \
    FROM profiles p \
    LEFT JOIN user_roles r ON r.user_id = p.id";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: Email,
    full_name: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    roles: Vec<String>,
    order_count: i64,
}

impl TryFrom<UserRow> for UserSummary {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|r| {
                r.parse::<Role>()
                    .map_err(|e| RepositoryError::DataCorruption(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            phone: row.phone,
            roles,
            order_count: row.order_count,
            created_at: row.created_at,
        })
    }
}

/// Access to profiles and their roles.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every profile with its roles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` for an unknown role string.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UserSummary>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "{USER_SELECT} GROUP BY p.id ORDER BY p.created_at DESC, p.id"
        ))
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(UserSummary::try_from)
        .collect()
    }

    /// One profile with its roles.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(user_id = %id))]
    pub async fn get(&self, id: UserId) -> Result<Option<UserSummary>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE p.id = $1 GROUP BY p.id"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .map(UserSummary::try_from)
            .transpose()
    }

    /// Grant a role. Granting a held role is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    #[tracing::instrument(skip(self), fields(user_id = %id, role = %role))]
    pub async fn grant(&self, id: UserId, role: Role) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) \
             ON CONFLICT (user_id, role) DO NOTHING",
        )
        .bind(id)
        .bind(role)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            other => RepositoryError::Database(other),
        })?;
        Ok(())
    }

    /// Revoke a role.
    ///
    /// Returns whether a grant was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(user_id = %id, role = %role))]
    pub async fn revoke(&self, id: UserId, role: Role) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
            .bind(id)
            .bind(role)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
