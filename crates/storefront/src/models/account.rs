//! Account models: profile and saved addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jerseyworks_core::{AddressId, Email, UserId};

/// A customer profile.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A saved shipping address.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub label: Option<String>,
    pub recipient_name: String,
    pub phone: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing an address.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressInput {
    pub label: Option<String>,
    pub recipient_name: String,
    pub phone: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Country used when an address does not name one.
pub const DEFAULT_COUNTRY: &str = "India";

impl AddressInput {
    /// Trim every field and reject blank required ones.
    ///
    /// Returns the name of the first missing field on failure.
    pub fn normalized(self) -> Result<Self, &'static str> {
        fn required(value: String, field: &'static str) -> Result<String, &'static str> {
            let value = value.trim().to_owned();
            if value.is_empty() { Err(field) } else { Ok(value) }
        }
        fn optional(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
        }

        Ok(Self {
            label: optional(self.label),
            recipient_name: required(self.recipient_name, "recipient_name")?,
            phone: optional(self.phone),
            line1: required(self.line1, "line1")?,
            line2: optional(self.line2),
            city: required(self.city, "city")?,
            state: required(self.state, "state")?,
            postal_code: required(self.postal_code, "postal_code")?,
            country: Some(optional(self.country).unwrap_or_else(|| DEFAULT_COUNTRY.to_owned())),
            is_default: self.is_default,
        })
    }
}
