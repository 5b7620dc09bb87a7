//! Authenticated caller identity.

use serde::Serialize;

use jerseyworks_core::{Email, UserId};

/// The user behind a verified bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    /// Profile ID.
    pub id: UserId,
    /// Profile email.
    pub email: Email,
}
