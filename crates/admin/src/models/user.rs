//! Customer and staff accounts as listed in the back office.

use chrono::{DateTime, Utc};
use serde::Serialize;

use jerseyworks_core::{Email, Role, UserId};

/// A profile with its granted roles.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub roles: Vec<Role>,
    pub order_count: i64,
    pub created_at: DateTime<Utc>,
}

impl UserSummary {
    /// Whether the user may use the back office.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}
