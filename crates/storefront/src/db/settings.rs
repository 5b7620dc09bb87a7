//! Store rules read from the `settings` table.

use serde_json::Value as JsonValue;
use sqlx::PgPool;

use jerseyworks_core::pricing::{
    BOOKING_PERCENT_RANGE, DEFAULT_BOOKING_PERCENT, DEFAULT_MIN_LINE_QUANTITY, MAX_LINE_QUANTITY,
};

use super::RepositoryError;

/// Settings key for the share of the total due at booking.
pub const BOOKING_PERCENT_KEY: &str = "booking_percent";
/// Settings key for the smallest allowed line quantity.
pub const MIN_LINE_QUANTITY_KEY: &str = "min_line_quantity";

/// The settings the storefront enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreRules {
    /// Percent of the order total collected before production.
    pub booking_percent: u32,
    /// Smallest quantity a cart line may hold.
    pub min_line_quantity: u32,
}

impl Default for StoreRules {
    fn default() -> Self {
        Self {
            booking_percent: DEFAULT_BOOKING_PERCENT,
            min_line_quantity: DEFAULT_MIN_LINE_QUANTITY,
        }
    }
}

impl StoreRules {
    /// Build rules from raw `(key, value)` rows, ignoring unusable values.
    #[must_use]
    pub fn from_rows(rows: &[(String, JsonValue)]) -> Self {
        let mut rules = Self::default();
        for (key, value) in rows {
            let Some(number) = value.as_u64().and_then(|n| u32::try_from(n).ok()) else {
                if !value.is_null() {
                    tracing::warn!(key = %key, "ignoring non-numeric store rule");
                }
                continue;
            };
            match key.as_str() {
                BOOKING_PERCENT_KEY if BOOKING_PERCENT_RANGE.contains(&number) => {
                    rules.booking_percent = number;
                }
                MIN_LINE_QUANTITY_KEY if (1..=MAX_LINE_QUANTITY).contains(&number) => {
                    rules.min_line_quantity = number;
                }
                _ => {}
            }
        }
        rules
    }
}

/// Read-only access to store settings.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the current store rules, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self))]
    pub async fn store_rules(&self) -> Result<StoreRules, RepositoryError> {
        let rows: Vec<(String, JsonValue)> =
            sqlx::query_as("SELECT key, value FROM settings WHERE key = ANY($1)")
                .bind([BOOKING_PERCENT_KEY, MIN_LINE_QUANTITY_KEY].as_slice())
                .fetch_all(self.pool)
                .await?;

        Ok(StoreRules::from_rows(&rows))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        assert_eq!(StoreRules::from_rows(&[]), StoreRules::default());
        assert_eq!(StoreRules::default().booking_percent, 50);
        assert_eq!(StoreRules::default().min_line_quantity, 10);
    }

    #[test]
    fn test_reads_overrides() {
        let rows = vec![
            (BOOKING_PERCENT_KEY.to_owned(), json!(30)),
            (MIN_LINE_QUANTITY_KEY.to_owned(), json!(25)),
        ];
        let rules = StoreRules::from_rows(&rows);
        assert_eq!(rules.booking_percent, 30);
        assert_eq!(rules.min_line_quantity, 25);
    }

    #[test]
    fn test_zero_booking_percent_keeps_default() {
        let rows = vec![(BOOKING_PERCENT_KEY.to_owned(), json!(0))];
        assert_eq!(StoreRules::from_rows(&rows).booking_percent, 50);
    }

    #[test]
    fn test_ignores_out_of_range_values() {
        let rows = vec![
            (BOOKING_PERCENT_KEY.to_owned(), json!(150)),
            (MIN_LINE_QUANTITY_KEY.to_owned(), json!(0)),
            ("store_name".to_owned(), json!("Jerseyworks")),
        ];
        assert_eq!(StoreRules::from_rows(&rows), StoreRules::default());
    }
}
