//! Identity of the admin making a request.

use serde::{Deserialize, Serialize};

use jerseyworks_core::{Email, UserId};

/// A signed-in user that holds the `admin` role.
///
/// Cached per token hash by the admin guard.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: Email,
}
