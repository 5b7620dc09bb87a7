//! Product list filtering for the back office.
//!
//! The catalog is small enough to hold in memory, so the admin list loads
//! every product and filters here.

use serde::Deserialize;

use jerseyworks_core::CategoryId;

use crate::models::Product;

/// Sort order for the admin product list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    Oldest,
    Name,
    PriceAsc,
    PriceDesc,
}

/// Query string of `GET /api/products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    /// Case-insensitive match on name, description or subcategory.
    pub q: Option<String>,
    pub category_id: Option<CategoryId>,
    pub popular: Option<bool>,
    #[serde(default)]
    pub sort: ProductSort,
}

impl ProductQuery {
    /// Apply the filters and sort.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let needle = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let mut products: Vec<Product> = products
            .into_iter()
            .filter(|p| self.category_id.is_none_or(|id| p.category_id == Some(id)))
            .filter(|p| self.popular.is_none_or(|popular| p.is_popular == popular))
            .filter(|p| needle.as_deref().is_none_or(|n| matches_text(p, n)))
            .collect();

        match self.sort {
            ProductSort::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ProductSort::Oldest => products.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            ProductSort::Name => {
                products.sort_by_cached_key(|p| p.name.to_lowercase());
            }
            ProductSort::PriceAsc => products.sort_by(|a, b| a.prices.tier1.cmp(&b.prices.tier1)),
            ProductSort::PriceDesc => {
                products.sort_by(|a, b| b.prices.tier1.cmp(&a.prices.tier1));
            }
        }
        products
    }
}

fn matches_text(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product
            .subcategory
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(needle))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use jerseyworks_core::{CustomizationOptions, PriceTiers, ProductId};

    use super::*;

    fn product(name: &str, tier1: i64, age_days: i64, popular: bool) -> Product {
        let created = Utc::now() - Duration::days(age_days);
        Product {
            id: ProductId::new(),
            name: name.to_owned(),
            description: format!("{name} in breathable mesh"),
            image_url: None,
            prices: PriceTiers {
                tier1: Decimal::from(tier1),
                tier2: Decimal::from(tier1 - 50),
                tier3: Decimal::from(tier1 - 100),
            },
            customization: CustomizationOptions::default(),
            is_popular: popular,
            features: vec![],
            subcategory: Some("Club".to_owned()),
            category_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("Home Kit", 650, 3, true),
            product("Away Kit", 600, 1, false),
            product("Training Tee", 400, 2, true),
        ]
    }

    #[test]
    fn test_default_is_newest_first() {
        let out = ProductQuery::default().apply(catalog());
        assert_eq!(names(&out), vec!["Away Kit", "Training Tee", "Home Kit"]);
    }

    #[test]
    fn test_text_filter_is_case_insensitive() {
        let query = ProductQuery {
            q: Some("  KIT ".into()),
            sort: ProductSort::Name,
            ..ProductQuery::default()
        };
        assert_eq!(names(&query.apply(catalog())), vec!["Away Kit", "Home Kit"]);
    }

    #[test]
    fn test_popular_and_price_sort() {
        let query = ProductQuery {
            popular: Some(true),
            sort: ProductSort::PriceDesc,
            ..ProductQuery::default()
        };
        assert_eq!(names(&query.apply(catalog())), vec!["Home Kit", "Training Tee"]);
    }

    #[test]
    fn test_category_filter_excludes_uncategorized() {
        let query = ProductQuery {
            category_id: Some(CategoryId::new()),
            ..ProductQuery::default()
        };
        assert!(query.apply(catalog()).is_empty());
    }
}
