//! Subcommand implementations.

pub mod migrate;
pub mod roles;
pub mod tokens;
pub mod users;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

use jerseyworks_core::UserId;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Argument could not be parsed.
    #[error("Invalid {what}: {value}")]
    InvalidArgument { what: &'static str, value: String },

    /// No profile with that ID.
    #[error("No user with ID {0}")]
    UserNotFound(UserId),

    /// A profile with that email already exists.
    #[error("A user already exists with email: {0}")]
    UserExists(String),
}

/// Connect using `DATABASE_URL`.
async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}

fn parse_user(raw: &str) -> Result<UserId, CommandError> {
    raw.trim()
        .parse()
        .map_err(|_| CommandError::InvalidArgument {
            what: "user ID",
            value: raw.to_owned(),
        })
}

async fn ensure_user(pool: &PgPool, user: UserId) -> Result<(), CommandError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM profiles WHERE id = $1)")
        .bind(user)
        .fetch_one(pool)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(CommandError::UserNotFound(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user() {
        assert!(parse_user(" 5f0c6a4e-2b1d-4c57-9d0a-3f2e1b7c8d90 ").is_ok());
        assert!(matches!(
            parse_user("not-a-uuid"),
            Err(CommandError::InvalidArgument { what: "user ID", .. })
        ));
    }
}
