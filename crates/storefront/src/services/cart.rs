//! Building and editing cart lines against product options and store rules.

use serde::Deserialize;

use jerseyworks_core::{
    CartError, CartLine, Customization, CustomizationOptions, ProductId, SizeDistribution,
};

use crate::db::settings::StoreRules;

/// Body of `POST /api/cart`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Omit to get the default split.
    pub size_distribution: Option<SizeDistribution>,
    #[serde(default)]
    pub customization: Customization,
    pub special_instructions: Option<String>,
}

/// Body of `PATCH /api/cart/items/{id}`. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCartItem {
    pub quantity: Option<u32>,
    /// An empty object re-derives the default split.
    pub size_distribution: Option<SizeDistribution>,
    /// Replaces the whole customization object.
    pub customization: Option<Customization>,
    /// An empty string clears the instructions.
    pub special_instructions: Option<String>,
}

/// Validate an add-to-cart request into a line ready to merge.
///
/// # Errors
///
/// Returns [`CartError::NotAllowed`] for customization the product does not
/// offer, [`CartError::BelowMinimum`] under the store minimum and
/// [`CartError::Sizes`] for a split that does not match the quantity.
pub fn build_line(
    request: AddToCart,
    options: CustomizationOptions,
    rules: StoreRules,
) -> Result<CartLine, CartError> {
    request.customization.check(options)?;
    CartLine::new(
        request.quantity,
        rules.min_line_quantity,
        request.size_distribution,
        request.customization,
        request.special_instructions,
    )
}

/// Apply a partial update to an existing line.
///
/// Quantity is applied first, so a new split is validated against the new
/// quantity. When only the quantity changes and the old split no longer
/// fits, the default split is used.
///
/// # Errors
///
/// Same as [`build_line`].
pub fn apply_update(
    mut line: CartLine,
    update: UpdateCartItem,
    options: CustomizationOptions,
    rules: StoreRules,
) -> Result<CartLine, CartError> {
    if let Some(quantity) = update.quantity {
        line.set_quantity(quantity, rules.min_line_quantity)?;
    }
    if let Some(sizes) = update.size_distribution {
        if sizes.is_empty() {
            line.size_distribution = SizeDistribution::default_for(line.quantity);
        } else {
            sizes.validate_for(line.quantity)?;
            line.size_distribution = sizes;
        }
    }
    if let Some(customization) = update.customization {
        customization.check(options)?;
        line.customization = customization;
    }
    if let Some(text) = update.special_instructions {
        let text = text.trim();
        line.special_instructions = (!text.is_empty()).then(|| text.to_owned());
    }
    Ok(line)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use jerseyworks_core::Size;

    use super::*;

    fn add(quantity: u32, customization: serde_json::Value) -> AddToCart {
        serde_json::from_value(json!({
            "product_id": ProductId::new(),
            "quantity": quantity,
            "customization": customization,
        }))
        .unwrap()
    }

    fn all_options() -> CustomizationOptions {
        CustomizationOptions {
            allow_name: true,
            allow_number: true,
            allow_logo: true,
            allow_custom_design: true,
        }
    }

    #[test]
    fn test_build_line_defaults_sizes() {
        let line = build_line(add(10, json!({})), all_options(), StoreRules::default()).unwrap();
        assert_eq!(line.size_distribution, SizeDistribution::default_for(10));
    }

    #[test]
    fn test_build_line_enforces_minimum() {
        let err = build_line(add(5, json!({})), all_options(), StoreRules::default()).unwrap_err();
        assert_eq!(err, CartError::BelowMinimum { min: 10, got: 5 });
    }

    #[test]
    fn test_build_line_rejects_disallowed_customization() {
        let err = build_line(
            add(10, json!({"logo": "crest.png"})),
            CustomizationOptions::default(),
            StoreRules::default(),
        )
        .unwrap_err();
        assert_eq!(err, CartError::NotAllowed("logo"));
    }

    #[test]
    fn test_apply_update_quantity_then_sizes() {
        let line = build_line(add(10, json!({})), all_options(), StoreRules::default()).unwrap();
        let sizes: SizeDistribution = [(Size::M, 12), (Size::L, 8)].into_iter().collect();
        let update = UpdateCartItem {
            quantity: Some(20),
            size_distribution: Some(sizes.clone()),
            ..UpdateCartItem::default()
        };

        let line = apply_update(line, update, all_options(), StoreRules::default()).unwrap();
        assert_eq!(line.quantity, 20);
        assert_eq!(line.size_distribution, sizes);
    }

    #[test]
    fn test_apply_update_clears_instructions() {
        let mut request = add(10, json!({}));
        request.special_instructions = Some("rush".into());
        let line = build_line(request, all_options(), StoreRules::default()).unwrap();

        let update = UpdateCartItem {
            special_instructions: Some("  ".into()),
            ..UpdateCartItem::default()
        };
        let line = apply_update(line, update, all_options(), StoreRules::default()).unwrap();
        assert!(line.special_instructions.is_none());
    }

    #[test]
    fn test_apply_update_rejects_mismatched_split() {
        let line = build_line(add(10, json!({})), all_options(), StoreRules::default()).unwrap();
        let update = UpdateCartItem {
            size_distribution: Some([(Size::S, 3)].into_iter().collect()),
            ..UpdateCartItem::default()
        };
        assert!(matches!(
            apply_update(line, update, all_options(), StoreRules::default()),
            Err(CartError::Sizes(_))
        ));
    }
}
