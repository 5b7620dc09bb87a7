//! Bearer session lookup restricted to admins.

use sqlx::PgPool;

use jerseyworks_core::{Role, UserId};

use super::RepositoryError;
use crate::models::CurrentAdmin;

/// Resolves token hashes to admins.
pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

/// What a token hash resolves to.
#[derive(Debug, Clone)]
pub enum SessionLookup {
    /// No live session for the token.
    Unknown,
    /// A live session whose user lacks the `admin` role.
    NotAdmin(UserId),
    /// A live session held by an admin.
    Admin(CurrentAdmin),
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: UserId,
    email: jerseyworks_core::Email,
    is_admin: bool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Resolve an unexpired session and check the admin role in one query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip_all)]
    pub async fn lookup(&self, token_hash: &str) -> Result<SessionLookup, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT p.id, p.email, \
                    EXISTS (SELECT 1 FROM user_roles r \
                            WHERE r.user_id = p.id AND r.role = $2) AS is_admin \
             FROM auth_sessions s \
             JOIN profiles p ON p.id = s.user_id \
             WHERE s.token_hash = $1 AND s.expires_at > NOW()",
        )
        .bind(token_hash)
        .bind(Role::Admin)
        .fetch_optional(self.pool)
        .await?;

        Ok(match row {
            None => SessionLookup::Unknown,
            Some(row) if row.is_admin => SessionLookup::Admin(CurrentAdmin {
                id: row.id,
                email: row.email,
            }),
            Some(row) => SessionLookup::NotAdmin(row.id),
        })
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
