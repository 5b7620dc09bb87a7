//! Catalog models and the inputs the back office accepts for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jerseyworks_core::{CategoryId, CustomizationOptions, PriceTiers, PricingError, ProductId};

/// A product category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub image_url: Option<String>,
    pub subcategories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A garment in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub prices: PriceTiers,
    #[serde(flatten)]
    pub customization: CustomizationOptions,
    pub is_popular: bool,
    pub features: Vec<String>,
    pub subcategory: Option<String>,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a catalog input was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Body for creating or replacing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    pub prices: PriceTiers,
    #[serde(flatten)]
    pub customization: CustomizationOptions,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub features: Vec<String>,
    pub subcategory: Option<String>,
    pub category_id: Option<CategoryId>,
}

impl ProductInput {
    /// Trim text, drop blank features and check the price tiers.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Required`] for a blank name and
    /// [`InputError::Pricing`] when the tiers are not positive,
    /// non-increasing and storable at two decimal places.
    pub fn normalized(self) -> Result<Self, InputError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(InputError::Required("name"));
        }
        self.prices.validate()?;

        Ok(Self {
            name,
            description: self.description.trim().to_owned(),
            image_url: non_blank(self.image_url),
            features: self
                .features
                .into_iter()
                .map(|f| f.trim().to_owned())
                .filter(|f| !f.is_empty())
                .collect(),
            subcategory: non_blank(self.subcategory),
            ..self
        })
    }
}

/// Body for creating or replacing a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

impl CategoryInput {
    /// Trim the name and subcategories, dropping blanks and
    /// case-insensitive duplicates (the first spelling wins).
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Required`] for a blank name.
    pub fn normalized(self) -> Result<Self, InputError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(InputError::Required("name"));
        }

        let mut seen = std::collections::HashSet::new();
        let subcategories = self
            .subcategories
            .into_iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
            .collect();

        Ok(Self {
            name,
            image_url: non_blank(self.image_url),
            subcategories,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product(prices: serde_json::Value) -> ProductInput {
        serde_json::from_value(json!({
            "name": "  Club Home Jersey ",
            "prices": prices,
            "allow_name": true,
            "features": ["Dri-fit", "  ", " Sublimated "],
            "subcategory": "  ",
        }))
        .unwrap()
    }

    #[test]
    fn test_product_input_normalizes() {
        let input = product(json!({"tier1": "650", "tier2": "600", "tier3": "550"}))
            .normalized()
            .unwrap();
        assert_eq!(input.name, "Club Home Jersey");
        assert_eq!(input.features, vec!["Dri-fit", "Sublimated"]);
        assert_eq!(input.subcategory, None);
        assert!(input.customization.allow_name);
        assert!(!input.customization.allow_logo);
    }

    #[test]
    fn test_product_input_rejects_increasing_tiers() {
        let err = product(json!({"tier1": "500", "tier2": "600", "tier3": "550"}))
            .normalized()
            .unwrap_err();
        assert_eq!(err, InputError::Pricing(PricingError::Increasing));
    }

    #[test]
    fn test_product_input_rejects_prices_the_columns_cannot_hold() {
        let err = product(json!({"tier1": "650.555", "tier2": "600", "tier3": "550"}))
            .normalized()
            .unwrap_err();
        assert!(matches!(err, InputError::Pricing(PricingError::Precision(_))));

        let err = product(json!({"tier1": "100000", "tier2": "600", "tier3": "550"}))
            .normalized()
            .unwrap_err();
        assert!(matches!(err, InputError::Pricing(PricingError::TooExpensive(_))));
    }

    #[test]
    fn test_category_subcategories_deduplicated() {
        let input = CategoryInput {
            name: " Football ".into(),
            image_url: None,
            subcategories: vec![
                "Club".into(),
                " club ".into(),
                "National".into(),
                String::new(),
                "CLUB".into(),
            ],
        }
        .normalized()
        .unwrap();
        assert_eq!(input.name, "Football");
        assert_eq!(input.subcategories, vec!["Club", "National"]);
    }

    #[test]
    fn test_category_requires_name() {
        let err = CategoryInput {
            name: "   ".into(),
            image_url: None,
            subcategories: vec![],
        }
        .normalized()
        .unwrap_err();
        assert_eq!(err, InputError::Required("name"));
    }
}
