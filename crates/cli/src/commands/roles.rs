//! Role grants.

use jerseyworks_core::{Role, UserId};

use super::{CommandError, connect, ensure_user, parse_user};

fn parse_role(raw: &str) -> Result<Role, CommandError> {
    raw.trim()
        .parse()
        .map_err(|_| CommandError::InvalidArgument {
            what: "role (expected admin or customer)",
            value: raw.to_owned(),
        })
}

fn parse_args(user: &str, role: &str) -> Result<(UserId, Role), CommandError> {
    Ok((parse_user(user)?, parse_role(role)?))
}

/// Grant `role` to `user`. Granting a held role is a no-op.
///
/// # Errors
///
/// Returns an error for an unknown user or role, or a database failure.
pub async fn grant(user: &str, role: &str) -> Result<(), CommandError> {
    let (user, role) = parse_args(user, role)?;
    let pool = connect().await?;
    ensure_user(&pool, user).await?;

    let result = sqlx::query(
        "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) \
         ON CONFLICT (user_id, role) DO NOTHING",
    )
    .bind(user)
    .bind(role)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        tracing::info!("User {} already has role {}", user, role);
    } else {
        tracing::info!("Granted {} to {}", role, user);
    }
    Ok(())
}

/// Revoke `role` from `user`.
///
/// # Errors
///
/// Returns an error for an unknown user or role, or a database failure.
pub async fn revoke(user: &str, role: &str) -> Result<(), CommandError> {
    let (user, role) = parse_args(user, role)?;
    let pool = connect().await?;
    ensure_user(&pool, user).await?;

    let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
        .bind(user)
        .bind(role)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        tracing::warn!("User {} did not have role {}", user, role);
    } else {
        tracing::info!("Revoked {} from {}", role, user);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("admin").unwrap(), Role::Admin);
        assert_eq!(parse_role(" customer ").unwrap(), Role::Customer);
        assert!(parse_role("super_admin").is_err());
    }
}
