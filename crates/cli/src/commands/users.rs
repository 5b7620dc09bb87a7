//! Profile management for local development.
//!
//! Production profiles are created by the identity provider; this command
//! exists so a fresh database can be exercised end to end.

use jerseyworks_core::{Email, Role, UserId};

use super::{CommandError, connect};

/// Create a profile with the `customer` role.
///
/// # Errors
///
/// Returns an error for a malformed email, a duplicate email or a
/// database failure.
pub async fn add(email: &str, name: Option<&str>) -> Result<UserId, CommandError> {
    let email = Email::parse(email).map_err(|_| CommandError::InvalidArgument {
        what: "email",
        value: email.to_owned(),
    })?;
    let name = name.map(str::trim).filter(|n| !n.is_empty());

    let pool = connect().await?;
    let mut tx = pool.begin().await?;

    let id = UserId::new();
    let inserted = sqlx::query(
        "INSERT INTO profiles (id, email, full_name) VALUES ($1, $2, $3) \
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(id)
    .bind(email.as_str())
    .bind(name)
    .execute(&mut *tx)
    .await?;
    if inserted.rows_affected() == 0 {
        return Err(CommandError::UserExists(email.as_str().to_owned()));
    }

    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
        .bind(id)
        .bind(Role::Customer)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("User created successfully! ID: {}, Email: {}", id, email.as_str());
    Ok(id)
}
