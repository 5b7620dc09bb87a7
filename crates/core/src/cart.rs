//! Cart line rules: customization gating and merge-on-add.
//!
//! A user holds at most one cart line per product. Adding the same product
//! again folds the new contribution into the existing line with
//! [`CartLine::absorb`] instead of creating a second row.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pricing::MAX_LINE_QUANTITY;
use crate::sizes::{SizeDistribution, SizeError};

/// Customization key for a printed player name.
pub const NAME_KEY: &str = "name";
/// Customization key for a printed player number.
pub const NUMBER_KEY: &str = "number";
/// Customization key for a team logo.
pub const LOGO_KEY: &str = "logo";
/// Customization key for a fully custom design.
pub const CUSTOM_DESIGN_KEY: &str = "custom_design";

/// Errors from building or merging cart lines.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// Line quantity under the store minimum.
    #[error("quantity must be at least {min} (got {got})")]
    BelowMinimum {
        /// Store minimum.
        min: u32,
        /// Requested quantity.
        got: u32,
    },
    /// Line quantity over [`MAX_LINE_QUANTITY`].
    #[error("quantity must be at most {max} (got {got})")]
    AboveMaximum {
        /// Largest allowed quantity.
        max: u32,
        /// Requested or merged quantity.
        got: u32,
    },
    /// Merged quantity does not fit.
    #[error("quantity too large")]
    Overflow,
    /// Size counts do not match the quantity.
    #[error(transparent)]
    Sizes(#[from] SizeError),
    /// The product does not offer this customization.
    #[error("this product does not allow the '{0}' customization")]
    NotAllowed(&'static str),
}

/// Free-form customization attached to a cart line.
///
/// Values are opaque to the store except for the gated keys above.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Customization(Map<String, Value>);

impl Customization {
    /// An empty customization.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Shallow merge: keys in `newer` replace keys in `self`.
    pub fn merge(&mut self, newer: &Self) {
        for (key, value) in &newer.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Whether `key` holds a non-null value.
    #[must_use]
    pub fn uses(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|value| !value.is_null())
    }

    /// Look up one value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Reject keys the product does not offer.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotAllowed`] for the first disallowed key.
    pub fn check(&self, options: CustomizationOptions) -> Result<(), CartError> {
        let gates = [
            (NAME_KEY, options.allow_name),
            (NUMBER_KEY, options.allow_number),
            (LOGO_KEY, options.allow_logo),
            (CUSTOM_DESIGN_KEY, options.allow_custom_design),
        ];
        for (key, allowed) in gates {
            if !allowed && self.uses(key) {
                return Err(CartError::NotAllowed(key));
            }
        }
        Ok(())
    }

    /// Borrow the raw JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Customization {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Which customizations a product offers. Omitted flags are off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CustomizationOptions {
    pub allow_name: bool,
    pub allow_number: bool,
    pub allow_logo: bool,
    pub allow_custom_design: bool,
}

/// The mergeable content of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub quantity: u32,
    pub size_distribution: SizeDistribution,
    pub customization: Customization,
    pub special_instructions: Option<String>,
}

impl CartLine {
    /// Build a line, filling in the default size split when none is given.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::BelowMinimum`] when `quantity < min_quantity`,
    /// [`CartError::AboveMaximum`] above [`MAX_LINE_QUANTITY`] and
    /// [`CartError::Sizes`] when an explicit split does not sum to `quantity`.
    pub fn new(
        quantity: u32,
        min_quantity: u32,
        sizes: Option<SizeDistribution>,
        customization: Customization,
        special_instructions: Option<String>,
    ) -> Result<Self, CartError> {
        check_quantity(quantity, min_quantity)?;
        let size_distribution = match sizes {
            Some(sizes) if !sizes.is_empty() => {
                sizes.validate_for(quantity)?;
                sizes
            }
            _ => SizeDistribution::default_for(quantity),
        };
        Ok(Self {
            quantity,
            size_distribution,
            customization,
            special_instructions: normalize_instructions(special_instructions),
        })
    }

    /// Fold another contribution for the same product into this line.
    ///
    /// Quantities add, size counts add per size, customization is shallow
    /// merged with `incoming` winning, and instructions are replaced only
    /// when `incoming` carries some.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AboveMaximum`] if the merged quantity exceeds
    /// [`MAX_LINE_QUANTITY`]; the line is left unchanged.
    pub fn absorb(&mut self, incoming: &Self) -> Result<(), CartError> {
        let quantity = self
            .quantity
            .checked_add(incoming.quantity)
            .ok_or(CartError::Overflow)?;
        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::AboveMaximum {
                max: MAX_LINE_QUANTITY,
                got: quantity,
            });
        }
        self.quantity = quantity;
        self.size_distribution.merge(&incoming.size_distribution);
        self.customization.merge(&incoming.customization);
        if incoming.special_instructions.is_some() {
            self.special_instructions
                .clone_from(&incoming.special_instructions);
        }
        Ok(())
    }

    /// Change the quantity, keeping the split if it still fits.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::BelowMinimum`] when `quantity < min_quantity` and
    /// [`CartError::AboveMaximum`] above [`MAX_LINE_QUANTITY`].
    pub fn set_quantity(&mut self, quantity: u32, min_quantity: u32) -> Result<(), CartError> {
        check_quantity(quantity, min_quantity)?;
        self.quantity = quantity;
        if self.size_distribution.validate_for(quantity).is_err() {
            self.size_distribution = SizeDistribution::default_for(quantity);
        }
        Ok(())
    }
}

fn check_quantity(quantity: u32, min_quantity: u32) -> Result<(), CartError> {
    if quantity == 0 || quantity < min_quantity {
        return Err(CartError::BelowMinimum {
            min: min_quantity.max(1),
            got: quantity,
        });
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(CartError::AboveMaximum {
            max: MAX_LINE_QUANTITY,
            got: quantity,
        });
    }
    Ok(())
}

fn normalize_instructions(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty())
}
