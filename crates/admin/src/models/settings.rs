//! Store settings: raw rows and the typed view built from them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use jerseyworks_core::Email;
use jerseyworks_core::pricing::{
    BOOKING_PERCENT_RANGE, DEFAULT_BOOKING_PERCENT, DEFAULT_MIN_LINE_QUANTITY, MAX_LINE_QUANTITY,
};

/// Settings key for the shop name.
pub const STORE_NAME_KEY: &str = "store_name";
/// Settings key for the public contact address.
pub const CONTACT_EMAIL_KEY: &str = "contact_email";
/// Settings key for the share of the total due at booking.
pub const BOOKING_PERCENT_KEY: &str = "booking_percent";
/// Settings key for the smallest allowed line quantity.
pub const MIN_LINE_QUANTITY_KEY: &str = "min_line_quantity";

/// One row of the `settings` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SettingEntry {
    pub key: String,
    pub value: JsonValue,
    pub updated_at: DateTime<Utc>,
}

/// Why a setting value was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingError {
    #[error("{key} must be {expected}")]
    Invalid {
        key: String,
        expected: &'static str,
    },
}

/// Known settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSettings {
    pub store_name: String,
    pub contact_email: Option<String>,
    pub booking_percent: u32,
    pub min_line_quantity: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "Jerseyworks".to_owned(),
            contact_email: None,
            booking_percent: DEFAULT_BOOKING_PERCENT,
            min_line_quantity: DEFAULT_MIN_LINE_QUANTITY,
        }
    }
}

impl StoreSettings {
    /// Build the typed view, keeping defaults for missing or unusable rows.
    #[must_use]
    pub fn from_entries(entries: &[SettingEntry]) -> Self {
        let mut settings = Self::default();
        for entry in entries {
            if validate(&entry.key, &entry.value).is_err() {
                continue;
            }
            match (entry.key.as_str(), &entry.value) {
                (STORE_NAME_KEY, JsonValue::String(name)) => settings.store_name.clone_from(name),
                (CONTACT_EMAIL_KEY, JsonValue::String(email)) => {
                    settings.contact_email = Some(email.clone());
                }
                (BOOKING_PERCENT_KEY, value) => {
                    settings.booking_percent = as_u32(value).unwrap_or(DEFAULT_BOOKING_PERCENT);
                }
                (MIN_LINE_QUANTITY_KEY, value) => {
                    settings.min_line_quantity =
                        as_u32(value).unwrap_or(DEFAULT_MIN_LINE_QUANTITY);
                }
                _ => {}
            }
        }
        settings
    }
}

fn as_u32(value: &JsonValue) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}

/// Check a value before it is stored under a known key.
///
/// Unknown keys accept any JSON.
///
/// # Errors
///
/// Returns [`SettingError::Invalid`] naming what the key expects.
pub fn validate(key: &str, value: &JsonValue) -> Result<(), SettingError> {
    let ok = match key {
        STORE_NAME_KEY => value.as_str().is_some_and(|s| !s.trim().is_empty()),
        CONTACT_EMAIL_KEY => {
            value.is_null() || value.as_str().is_some_and(|s| Email::parse(s).is_ok())
        }
        BOOKING_PERCENT_KEY => as_u32(value).is_some_and(|n| BOOKING_PERCENT_RANGE.contains(&n)),
        MIN_LINE_QUANTITY_KEY => {
            as_u32(value).is_some_and(|n| (1..=MAX_LINE_QUANTITY).contains(&n))
        }
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(SettingError::Invalid {
            key: key.to_owned(),
            expected: expected_for(key),
        })
    }
}

fn expected_for(key: &str) -> &'static str {
    match key {
        STORE_NAME_KEY => "a non-empty string",
        CONTACT_EMAIL_KEY => "an email address or null",
        BOOKING_PERCENT_KEY => "an integer from 1 to 100",
        MIN_LINE_QUANTITY_KEY => "an integer from 1 to 100000",
        _ => "valid JSON",
    }
}
