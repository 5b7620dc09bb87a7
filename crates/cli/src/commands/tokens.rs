//! Developer bearer tokens.
//!
//! The raw token is printed once. Only its SHA-256 digest is stored, which
//! is what both servers look up.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use jerseyworks_core::token::hash_token;

use super::{CommandError, connect, ensure_user, parse_user};

/// Random bytes per token.
const TOKEN_BYTES: usize = 32;

/// Longest allowed token lifetime.
const MAX_DAYS: i32 = 365;

/// Generate a URL-safe random token.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn check_days(days: i32) -> Result<i32, CommandError> {
    if (1..=MAX_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(CommandError::InvalidArgument {
            what: "days (1 to 365)",
            value: days.to_string(),
        })
    }
}

/// Issue a token for `user` valid for `days` days and print it.
///
/// # Errors
///
/// Returns an error for an unknown user, an out-of-range lifetime or a
/// database failure.
pub async fn issue(user: &str, days: i32) -> Result<(), CommandError> {
    let user = parse_user(user)?;
    let days = check_days(days)?;
    let pool = connect().await?;
    ensure_user(&pool, user).await?;

    let token = generate_token();
    sqlx::query(
        "INSERT INTO auth_sessions (token_hash, user_id, expires_at) \
         VALUES ($1, $2, NOW() + make_interval(days => $3))",
    )
    .bind(hash_token(&token))
    .bind(user)
    .bind(days)
    .execute(&pool)
    .await?;

    tracing::info!("Token issued for {} (expires in {} days)", user, days);

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_url_safe_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 43);
        assert!(
            a.bytes()
                .all(|c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_')
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_check_days() {
        assert!(check_days(1).is_ok());
        assert!(check_days(MAX_DAYS).is_ok());
        assert!(check_days(0).is_err());
        assert!(check_days(MAX_DAYS + 1).is_err());
    }
}
