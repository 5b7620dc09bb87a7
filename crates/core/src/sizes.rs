//! Garment sizes and per-line size distributions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Garment size, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Size {
    S,
    M,
    L,
    #[serde(rename = "XL")]
    Xl,
    #[serde(rename = "XXL")]
    Xxl,
}

impl Size {
    /// Every size, smallest first.
    pub const ALL: [Self; 5] = [Self::S, Self::M, Self::L, Self::Xl, Self::Xxl];

    /// Label printed on the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::Xl => "XL",
            Self::Xxl => "XXL",
        }
    }
}

/// Sizes trimmed first when the default allocation overshoots.
const TRIM_ORDER: [Size; 3] = [Size::Xxl, Size::Xl, Size::S];

/// Sizes trimmed only once `TRIM_ORDER` is exhausted.
const FALLBACK_TRIM_ORDER: [Size; 2] = [Size::L, Size::M];

/// Errors from size-distribution checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SizeError {
    /// Per-size counts do not add up to the line quantity.
    #[error("size counts add up to {actual}, expected {expected}")]
    Mismatch {
        /// Line quantity.
        expected: u64,
        /// Sum of the per-size counts.
        actual: u64,
    },
}

/// How many garments of each size a line contains.
///
/// Serialized as a plain object, e.g. `{"S": 2, "M": 3, "L": 3, "XL": 1, "XXL": 1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeDistribution(BTreeMap<Size, u32>);

impl SizeDistribution {
    /// An empty distribution.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// The suggested split for `quantity` garments.
    ///
    /// Splits evenly, hands the remainder to the smallest sizes, then leans
    /// one extra each toward M and L (the most requested sizes). The two
    /// extra units are taken back one at a time from XXL, XL and S, and from
    /// L and M only when the small sizes are already empty. The result
    /// always sums to `quantity`.
    ///
    /// ```
    /// use jerseyworks_core::sizes::{Size, SizeDistribution};
    ///
    /// let split = SizeDistribution::default_for(10);
    /// assert_eq!(split.get(Size::M), 3);
    /// assert_eq!(split.get(Size::Xxl), 1);
    /// assert_eq!(split.total(), 10);
    /// ```
    #[must_use]
    pub fn default_for(quantity: u32) -> Self {
        let base = quantity / 5;
        let remainder = quantity % 5;

        let mut split = Self::new();
        for (index, size) in Size::ALL.into_iter().enumerate() {
            let extra = u32::from(u32::try_from(index).unwrap_or(u32::MAX) < remainder);
            split.0.insert(size, base + extra);
        }

        split.add(Size::M, 1);
        split.add(Size::L, 1);
        let mut excess = split.total().saturating_sub(u64::from(quantity));

        while excess > 0 {
            let mut trimmed = false;
            for size in TRIM_ORDER {
                if excess > 0 && split.take_one(size) {
                    excess -= 1;
                    trimmed = true;
                }
            }
            if !trimmed {
                break;
            }
        }
        for size in FALLBACK_TRIM_ORDER {
            while excess > 0 && split.take_one(size) {
                excess -= 1;
            }
        }

        split
    }

    /// Count for one size (zero when absent).
    #[must_use]
    pub fn get(&self, size: Size) -> u32 {
        self.0.get(&size).copied().unwrap_or(0)
    }

    /// Set the count for one size.
    pub fn set(&mut self, size: Size, count: u32) {
        self.0.insert(size, count);
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().map(|&count| u64::from(count)).sum()
    }

    /// Whether no size has a count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterate sizes with their counts, smallest size first.
    pub fn iter(&self) -> impl Iterator<Item = (Size, u32)> + '_ {
        self.0.iter().map(|(&size, &count)| (size, count))
    }

    /// Add `other` into `self`, summing per size.
    pub fn merge(&mut self, other: &Self) {
        for (size, count) in other.iter() {
            self.add(size, count);
        }
    }

    /// Check that the counts add up to `quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`SizeError::Mismatch`] otherwise.
    pub fn validate_for(&self, quantity: u32) -> Result<(), SizeError> {
        let actual = self.total();
        if actual == u64::from(quantity) {
            Ok(())
        } else {
            Err(SizeError::Mismatch {
                expected: u64::from(quantity),
                actual,
            })
        }
    }

    fn add(&mut self, size: Size, count: u32) {
        let slot = self.0.entry(size).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    fn take_one(&mut self, size: Size) -> bool {
        match self.0.get_mut(&size) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

impl FromIterator<(Size, u32)> for SizeDistribution {
    fn from_iter<I: IntoIterator<Item = (Size, u32)>>(iter: I) -> Self {
        let mut split = Self::new();
        for (size, count) in iter {
            split.add(size, count);
        }
        split
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn counts(split: &SizeDistribution) -> [u32; 5] {
        Size::ALL.map(|size| split.get(size))
    }

    #[test]
    fn test_default_always_sums_to_quantity() {
        for quantity in 0..=1_000 {
            let split = SizeDistribution::default_for(quantity);
            assert_eq!(split.total(), u64::from(quantity), "quantity {quantity}");
        }
    }

    #[test]
    fn test_default_ten() {
        assert_eq!(counts(&SizeDistribution::default_for(10)), [2, 3, 3, 1, 1]);
    }

    #[test]
    fn test_default_with_remainder() {
        // 7 = 1 each + remainder 2 to S and M, bias M/L, trim XXL and XL.
        assert_eq!(counts(&SizeDistribution::default_for(7)), [2, 3, 2, 0, 0]);
        // 13 = 2 each + remainder 3 to S, M, L, bias M/L, trim XXL and XL.
        assert_eq!(counts(&SizeDistribution::default_for(13)), [3, 4, 4, 1, 1]);
    }

    #[test]
    fn test_default_tiny_quantities() {
        assert_eq!(counts(&SizeDistribution::default_for(0)), [0; 5]);
        assert_eq!(counts(&SizeDistribution::default_for(1)), [0, 1, 0, 0, 0]);
        assert_eq!(counts(&SizeDistribution::default_for(2)), [0, 2, 0, 0, 0]);
    }

    #[test]
    fn test_default_large_quantity_is_balanced() {
        let split = SizeDistribution::default_for(500);
        assert_eq!(counts(&split), [100, 101, 101, 99, 99]);
    }

    #[test]
    fn test_merge_sums_per_size() {
        let mut a: SizeDistribution = [(Size::S, 2), (Size::M, 3)].into_iter().collect();
        let b: SizeDistribution = [(Size::M, 1), (Size::Xxl, 4)].into_iter().collect();
        a.merge(&b);
        assert_eq!(counts(&a), [2, 4, 0, 0, 4]);
        assert_eq!(a.total(), 10);
    }

    #[test]
    fn test_validate_for() {
        let split = SizeDistribution::default_for(25);
        assert!(split.validate_for(25).is_ok());
        assert_eq!(
            split.validate_for(30),
            Err(SizeError::Mismatch {
                expected: 30,
                actual: 25
            })
        );
    }

    #[test]
    fn test_json_shape() {
        let split: SizeDistribution =
            serde_json::from_str(r#"{"S": 1, "XL": 2, "XXL": 3}"#).unwrap();
        assert_eq!(split.get(Size::Xl), 2);
        assert_eq!(split.get(Size::M), 0);
        let json = serde_json::to_string(&split).unwrap();
        assert_eq!(json, r#"{"S":1,"XL":2,"XXL":3}"#);
        assert!(serde_json::from_str::<SizeDistribution>(r#"{"XS": 1}"#).is_err());
    }
}
