//! Public catalog routes: categories, products and price quotes.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use jerseyworks_core::{CategoryId, ProductId, Quote, SizeDistribution};

use crate::db::products::{DEFAULT_PAGE_SIZE, ProductFilter, ProductSort};
use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiPath, ApiQuery};
use crate::models::{Category, CategoryDetail, Product, ProductDetail};
use crate::state::AppState;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{id}", get(show_category))
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(show_product))
        .route("/api/products/{id}/quote", get(quote_product))
}

// =============================================================================
// Query Parameters
// =============================================================================

/// Query string of `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub category_id: Option<CategoryId>,
    pub subcategory: Option<String>,
    pub q: Option<String>,
    pub popular: Option<bool>,
    pub sort: Option<ProductSort>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ProductListQuery> for ProductFilter {
    fn from(query: ProductListQuery) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
        }

        Self {
            category_id: query.category_id,
            subcategory: non_blank(query.subcategory),
            search: non_blank(query.q),
            popular_only: query.popular.unwrap_or(false),
            sort: query.sort.unwrap_or_default(),
            limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            offset: query.offset.unwrap_or(0),
        }
    }
}

/// Query string of `GET /api/products/{id}/quote`.
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub quantity: u32,
}

/// Response of `GET /api/products/{id}/quote`.
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub product_id: ProductId,
    #[serde(flatten)]
    pub quote: Quote,
    /// Suggested split for the quoted quantity.
    pub default_sizes: SizeDistribution,
    pub min_quantity: u32,
    /// Whether the quantity is too small to add to the cart.
    pub below_minimum: bool,
}

// =============================================================================
// Handlers
// =============================================================================

#[instrument(skip(state))]
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

#[instrument(skip(state))]
async fn show_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<CategoryDetail>> {
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))
}

#[instrument(skip(state))]
async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = ProductFilter::from(query);
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
async fn show_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = find_product(&state, id).await?;
    let rules = state.store_rules().await?;
    Ok(Json(ProductDetail::new(product, rules.min_line_quantity)))
}

#[instrument(skip(state))]
async fn quote_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiQuery(query): ApiQuery<QuoteQuery>,
) -> Result<Json<QuoteResponse>> {
    let product = find_product(&state, id).await?;
    let rules = state.store_rules().await?;
    let quote = product.prices.quote(query.quantity)?;

    Ok(Json(QuoteResponse {
        product_id: product.id,
        quote,
        default_sizes: SizeDistribution::default_for(query.quantity),
        min_quantity: rules.min_line_quantity,
        below_minimum: query.quantity < rules.min_line_quantity,
    }))
}

async fn find_product(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let filter = ProductFilter::from(ProductListQuery::default());
        assert_eq!(filter.sort, ProductSort::Newest);
        assert_eq!(filter.limit, DEFAULT_PAGE_SIZE);
        assert!(!filter.popular_only);
        assert!(filter.search.is_none());
    }

    #[test]
    fn test_list_query_blank_strings_ignored() {
        let filter = ProductFilter::from(ProductListQuery {
            subcategory: Some("  ".into()),
            q: Some(" polo ".into()),
            ..ProductListQuery::default()
        });
        assert!(filter.subcategory.is_none());
        assert_eq!(filter.search.as_deref(), Some("polo"));
    }
}
