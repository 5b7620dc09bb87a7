//! Bearer token lookup.

use sqlx::PgPool;

use jerseyworks_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::CurrentUser;

#[derive(sqlx::FromRow)]
struct SessionUserRow {
    id: UserId,
    email: Email,
}

/// Repository resolving bearer tokens to users.
pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the user owning an unexpired session with this token digest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip_all)]
    pub async fn find_user(&self, token_hash: &str) -> Result<Option<CurrentUser>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionUserRow>(
            "SELECT p.id, p.email FROM auth_sessions s \
             JOIN profiles p ON p.id = s.user_id \
             WHERE s.token_hash = $1 AND s.expires_at > NOW()",
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| CurrentUser {
            id: r.id,
            email: r.email,
        }))
    }

    /// Whether the user holds `role`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, role = %role))]
    pub async fn has_role(&self, user_id: UserId, role: Role) -> Result<bool, RepositoryError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2)",
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(self.pool)
        .await?;
        Ok(found)
    }
}
