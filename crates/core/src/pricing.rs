//! Tiered bulk pricing.
//!
//! Every product carries three per-unit prices. The bracket is chosen from
//! the line quantity with inclusive upper bounds:
//!
//! | Quantity  | Price   |
//! |-----------|---------|
//! | 1 - 100   | `tier1` |
//! | 101 - 200 | `tier2` |
//! | 201+      | `tier3` |
//!
//! ```
//! use jerseyworks_core::pricing::PriceTiers;
//! use rust_decimal::Decimal;
//!
//! let tiers = PriceTiers::new(Decimal::from(650), Decimal::from(600), Decimal::from(550)).unwrap();
//! let quote = tiers.quote(150).unwrap();
//! assert_eq!(quote.unit_price, Decimal::from(600));
//! assert_eq!(quote.line_total, Decimal::from(90_000));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Highest quantity billed at `tier1`.
pub const TIER1_MAX_QUANTITY: u32 = 100;

/// Highest quantity billed at `tier2`.
pub const TIER2_MAX_QUANTITY: u32 = 200;

/// Smallest quantity a cart line may hold unless the store overrides it.
pub const DEFAULT_MIN_LINE_QUANTITY: u32 = 10;

/// Share of the order total collected up front, in percent.
pub const DEFAULT_BOOKING_PERCENT: u32 = 50;

/// Accepted booking percentages.
pub const BOOKING_PERCENT_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

/// Largest quantity one cart line may hold.
///
/// `MAX_LINE_QUANTITY * MAX_UNIT_PRICE` stays within [`MAX_AMOUNT`].
pub const MAX_LINE_QUANTITY: u32 = 100_000;

/// Highest per-unit price a tier may carry (99,999.99).
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(9_999_999, 0, 0, false, 2);

/// Largest amount the `NUMERIC(12,2)` money columns hold (9,999,999,999.99).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Decimal places a price may carry.
pub const PRICE_SCALE: u32 = 2;

/// Errors from price validation and quoting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// A quote was requested for zero units.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    /// A tier price is zero or negative.
    #[error("{0} price must be positive")]
    NonPositive(Tier),
    /// A larger bracket costs more per unit than a smaller one.
    #[error("tier prices must not increase with quantity")]
    Increasing,
    /// A tier price above [`MAX_UNIT_PRICE`].
    #[error("{0} price must not exceed {max}", max = MAX_UNIT_PRICE)]
    TooExpensive(Tier),
    /// A tier price with sub-paisa precision.
    #[error("{0} price must have at most {scale} decimal places", scale = PRICE_SCALE)]
    Precision(Tier),
    /// A quote was requested for more than [`MAX_LINE_QUANTITY`] units.
    #[error("quantity must not exceed {max}", max = MAX_LINE_QUANTITY)]
    QuantityTooLarge,
    /// An amount does not fit the money columns.
    #[error("amount must not exceed {max}", max = MAX_AMOUNT)]
    AmountTooLarge,
    /// Booking percentage outside 1..=100.
    #[error("booking percentage must be between 1 and 100")]
    BookingPercent,
}

/// A pricing bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Up to 100 units.
    Tier1,
    /// 101 to 200 units.
    Tier2,
    /// More than 200 units.
    Tier3,
}

impl Tier {
    /// The bracket a quantity falls into.
    #[must_use]
    pub const fn for_quantity(quantity: u32) -> Self {
        if quantity <= TIER1_MAX_QUANTITY {
            Self::Tier1
        } else if quantity <= TIER2_MAX_QUANTITY {
            Self::Tier2
        } else {
            Self::Tier3
        }
    }

    /// Quantity range shown next to the price.
    #[must_use]
    pub const fn range_label(self) -> &'static str {
        match self {
            Self::Tier1 => "up to 100",
            Self::Tier2 => "101-200",
            Self::Tier3 => "201+",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tier1 => f.write_str("tier 1"),
            Self::Tier2 => f.write_str("tier 2"),
            Self::Tier3 => f.write_str("tier 3"),
        }
    }
}

/// The three per-unit prices of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTiers {
    pub tier1: Decimal,
    pub tier2: Decimal,
    pub tier3: Decimal,
}

/// Price of one line at a given quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub quantity: u32,
    pub tier: Tier,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// One row of a product's price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierRow {
    pub tier: Tier,
    pub range: &'static str,
    pub unit_price: Decimal,
}

impl PriceTiers {
    /// Build validated tiers.
    ///
    /// # Errors
    ///
    /// See [`PriceTiers::validate`].
    pub fn new(tier1: Decimal, tier2: Decimal, tier3: Decimal) -> Result<Self, PricingError> {
        let tiers = Self {
            tier1,
            tier2,
            tier3,
        };
        tiers.validate()?;
        Ok(tiers)
    }

    /// Check that every price is positive, fits the price columns and none
    /// increases with quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NonPositive`], [`PricingError::TooExpensive`],
    /// [`PricingError::Precision`] or [`PricingError::Increasing`].
    pub fn validate(&self) -> Result<(), PricingError> {
        for tier in [Tier::Tier1, Tier::Tier2, Tier::Tier3] {
            let price = self.price_for(tier);
            if price <= Decimal::ZERO {
                return Err(PricingError::NonPositive(tier));
            }
            if price > MAX_UNIT_PRICE {
                return Err(PricingError::TooExpensive(tier));
            }
            if price.normalize().scale() > PRICE_SCALE {
                return Err(PricingError::Precision(tier));
            }
        }
        if self.tier2 > self.tier1 || self.tier3 > self.tier2 {
            return Err(PricingError::Increasing);
        }
        Ok(())
    }

    /// Per-unit price of a bracket.
    #[must_use]
    pub const fn price_for(&self, tier: Tier) -> Decimal {
        match tier {
            Tier::Tier1 => self.tier1,
            Tier::Tier2 => self.tier2,
            Tier::Tier3 => self.tier3,
        }
    }

    /// Effective per-unit price for `quantity` units.
    #[must_use]
    pub const fn unit_price(&self, quantity: u32) -> Decimal {
        self.price_for(Tier::for_quantity(quantity))
    }

    /// Price a line of `quantity` units.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::ZeroQuantity`] for an empty line and
    /// [`PricingError::QuantityTooLarge`] above [`MAX_LINE_QUANTITY`].
    pub fn quote(&self, quantity: u32) -> Result<Quote, PricingError> {
        if quantity == 0 {
            return Err(PricingError::ZeroQuantity);
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(PricingError::QuantityTooLarge);
        }
        let tier = Tier::for_quantity(quantity);
        let unit_price = self.price_for(tier);
        Ok(Quote {
            quantity,
            tier,
            unit_price,
            line_total: (unit_price * Decimal::from(quantity)).round_dp(2),
        })
    }

    /// The full price table, smallest bracket first.
    #[must_use]
    pub fn table(&self) -> [TierRow; 3] {
        [Tier::Tier1, Tier::Tier2, Tier::Tier3].map(|tier| TierRow {
            tier,
            range: tier.range_label(),
            unit_price: self.price_for(tier),
        })
    }
}

/// Check that an order amount fits the money columns.
///
/// # Errors
///
/// Returns [`PricingError::AmountTooLarge`] above [`MAX_AMOUNT`].
pub fn check_amount(amount: Decimal) -> Result<Decimal, PricingError> {
    if amount > MAX_AMOUNT {
        return Err(PricingError::AmountTooLarge);
    }
    Ok(amount)
}

/// Amount due up front for an order of `total`.
///
/// # Errors
///
/// Returns [`PricingError::BookingPercent`] when `percent` is outside
/// [`BOOKING_PERCENT_RANGE`].
pub fn booking_amount(total: Decimal, percent: u32) -> Result<Decimal, PricingError> {
    if !BOOKING_PERCENT_RANGE.contains(&percent) {
        return Err(PricingError::BookingPercent);
    }
    Ok((total * Decimal::from(percent) / Decimal::ONE_HUNDRED).round_dp(2))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tiers() -> PriceTiers {
        PriceTiers::new(Decimal::from(650), Decimal::from(600), Decimal::from(550)).unwrap()
    }

    #[test]
    fn test_tier1_up_to_100() {
        let t = tiers();
        for q in 1..=100 {
            assert_eq!(t.unit_price(q), t.tier1, "quantity {q}");
        }
    }

    #[test]
    fn test_tier2_from_101_to_200() {
        let t = tiers();
        for q in 101..=200 {
            assert_eq!(t.unit_price(q), t.tier2, "quantity {q}");
        }
    }

    #[test]
    fn test_tier3_above_200() {
        let t = tiers();
        for q in [201, 250, 1_000, u32::MAX] {
            assert_eq!(t.unit_price(q), t.tier3, "quantity {q}");
        }
    }

    #[test]
    fn test_quote_150_units() {
        let quote = tiers().quote(150).unwrap();
        assert_eq!(quote.tier, Tier::Tier2);
        assert_eq!(quote.unit_price, Decimal::from(600));
        assert_eq!(quote.line_total, Decimal::from(90_000));
    }

    #[test]
    fn test_quote_zero_rejected() {
        assert_eq!(tiers().quote(0), Err(PricingError::ZeroQuantity));
    }

    #[test]
    fn test_quote_quantity_cap() {
        assert!(tiers().quote(MAX_LINE_QUANTITY).is_ok());
        assert_eq!(
            tiers().quote(20_000_000),
            Err(PricingError::QuantityTooLarge)
        );
    }

    #[test]
    fn test_largest_line_fits_money_columns() {
        let top = PriceTiers::new(MAX_UNIT_PRICE, MAX_UNIT_PRICE, MAX_UNIT_PRICE).unwrap();
        let quote = top.quote(MAX_LINE_QUANTITY).unwrap();
        assert!(check_amount(quote.line_total).is_ok());
        assert_eq!(MAX_AMOUNT, Decimal::new(999_999_999_999, 2));
        assert_eq!(MAX_UNIT_PRICE, Decimal::new(9_999_999, 2));
    }

    #[test]
    fn test_check_amount() {
        assert_eq!(check_amount(MAX_AMOUNT), Ok(MAX_AMOUNT));
        assert_eq!(
            check_amount(Decimal::new(1_100_000_000_000, 2)),
            Err(PricingError::AmountTooLarge)
        );
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            PriceTiers::new(Decimal::ZERO, Decimal::ONE, Decimal::ONE),
            Err(PricingError::NonPositive(Tier::Tier1))
        );
        assert_eq!(
            PriceTiers::new(Decimal::from(500), Decimal::from(600), Decimal::from(400)),
            Err(PricingError::Increasing)
        );
        assert_eq!(
            PriceTiers::new(Decimal::new(10_000_000, 2), Decimal::ONE, Decimal::ONE),
            Err(PricingError::TooExpensive(Tier::Tier1))
        );
        assert_eq!(
            PriceTiers::new(Decimal::from(650), Decimal::new(599_995, 3), Decimal::ONE),
            Err(PricingError::Precision(Tier::Tier2))
        );
        // Trailing zeros are not extra precision.
        assert!(PriceTiers::new(Decimal::new(650_000, 3), Decimal::ONE, Decimal::ONE).is_ok());
        // Flat pricing is allowed.
        assert!(PriceTiers::new(Decimal::from(5), Decimal::from(5), Decimal::from(5)).is_ok());
    }

    #[test]
    fn test_table_order() {
        let rows = tiers().table();
        assert_eq!(rows[0].tier, Tier::Tier1);
        assert_eq!(rows[2].unit_price, Decimal::from(550));
        assert_eq!(rows[1].range, "101-200");
    }

    #[test]
    fn test_booking_amount() {
        assert_eq!(
            booking_amount(Decimal::from(90_000), 50).unwrap(),
            Decimal::from(45_000)
        );
        assert_eq!(
            booking_amount(Decimal::new(1001, 1), 33).unwrap(),
            Decimal::new(3303, 2)
        );
        assert_eq!(
            booking_amount(Decimal::ONE, 101),
            Err(PricingError::BookingPercent)
        );
        assert_eq!(
            booking_amount(Decimal::ONE, 0),
            Err(PricingError::BookingPercent)
        );
    }
}
