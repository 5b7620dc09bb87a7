//! Cart pricing and order placement.
//!
//! Checkout turns the caller's cart into an order in one transaction:
//! lock cart rows, price every line with the product's tiers, insert the
//! order with its items and first status row, then delete exactly the
//! lines that were priced. Any failure rolls the whole thing back, so no
//! order exists without items and no cart line disappears without being
//! ordered. A line added from another session while checkout runs stays
//! in the cart.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use jerseyworks_core::pricing::{booking_amount, check_amount};
use jerseyworks_core::{AddressId, CartItemId, OrderStatus, PricingError, UserId};

use crate::db::orders::{self, NewOrder};
use crate::db::settings::StoreRules;
use crate::db::{RepositoryError, addresses, cart};
use crate::models::{CartEntry, CartView, OrderDetail, PricedCartLine};

/// Note written to the first status row of every order.
const ORDER_PLACED_NOTE: &str = "Order placed";

/// Errors from checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("address not found")]
    AddressNotFound,
    #[error("{product}: {source}")]
    Pricing {
        product: String,
        #[source]
        source: PricingError,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    pub address_id: Option<AddressId>,
    pub notes: Option<String>,
}

/// Price every cart entry at its current tier.
///
/// # Errors
///
/// Returns `CheckoutError::Pricing` naming the first line that cannot be priced.
pub fn price_entries(entries: Vec<CartEntry>) -> Result<CartView, CheckoutError> {
    let mut lines = Vec::with_capacity(entries.len());
    let mut subtotal = Decimal::ZERO;
    let mut total_quantity = 0_u64;

    for entry in entries {
        let quote = entry
            .prices
            .quote(entry.item.line.quantity)
            .map_err(|source| CheckoutError::Pricing {
                product: entry.product_name.clone(),
                source,
            })?;
        subtotal += quote.line_total;
        total_quantity += u64::from(quote.quantity);
        lines.push(PricedCartLine {
            item: entry.item,
            product_name: entry.product_name,
            image_url: entry.image_url,
            tier: quote.tier,
            unit_price: quote.unit_price,
            line_total: quote.line_total,
        });
    }

    Ok(CartView {
        line_count: lines.len(),
        lines,
        total_quantity,
        subtotal,
    })
}

fn order_pricing(source: PricingError) -> CheckoutError {
    CheckoutError::Pricing {
        product: "order".to_owned(),
        source,
    }
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for everything in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` when there is nothing to buy,
    /// `CheckoutError::AddressNotFound` when `address_id` is not the user's,
    /// and `CheckoutError::Repository` for database failures. Nothing is
    /// written in any error case.
    #[tracing::instrument(skip(self, request, rules), fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: &CheckoutRequest,
        rules: StoreRules,
    ) -> Result<OrderDetail, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        let entries = cart::load_entries(&mut tx, user_id, true).await?;
        if entries.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        if let Some(address_id) = request.address_id
            && !addresses::belongs_to(&mut tx, user_id, address_id).await?
        {
            return Err(CheckoutError::AddressNotFound);
        }

        let priced = price_entries(entries)?;
        let total = check_amount(priced.subtotal).map_err(order_pricing)?;
        let booking = booking_amount(total, rules.booking_percent).map_err(order_pricing)?;
        let notes = request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let order = orders::insert_order(
            &mut tx,
            &NewOrder {
                user_id,
                total_amount: total,
                booking_amount: booking,
                address_id: request.address_id,
                notes,
            },
        )
        .await?;

        for line in &priced.lines {
            orders::insert_item(
                &mut tx,
                order.id,
                line.item.product_id,
                &line.product_name,
                &line.item.line,
                line.unit_price,
                line.line_total,
            )
            .await?;
        }

        orders::insert_status_update(
            &mut tx,
            order.id,
            OrderStatus::Pending,
            Some(ORDER_PLACED_NOTE),
            Some(user_id),
        )
        .await?;

        let ordered: Vec<CartItemId> = priced.lines.iter().map(|line| line.item.id).collect();
        let cleared = cart::remove_lines(&mut tx, user_id, &ordered).await?;
        let detail = orders::load_detail(&mut tx, order).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = %detail.order.id,
            lines = cleared,
            total = %detail.order.total_amount,
            "order placed"
        );
        Ok(detail)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use jerseyworks_core::{
        CartLine, Customization, CustomizationOptions, PriceTiers, ProductId, Tier,
    };

    use super::*;
    use crate::models::CartItem;

    fn entry(name: &str, quantity: u32) -> CartEntry {
        let now = Utc::now();
        CartEntry {
            item: CartItem {
                id: CartItemId::new(),
                product_id: ProductId::new(),
                line: CartLine::new(quantity, 1, None, Customization::new(), None).unwrap(),
                created_at: now,
                updated_at: now,
            },
            product_name: name.to_owned(),
            image_url: None,
            prices: PriceTiers::new(Decimal::from(650), Decimal::from(600), Decimal::from(550))
                .unwrap(),
            options: CustomizationOptions::default(),
        }
    }

    #[test]
    fn test_price_entries_uses_tier_per_line() {
        let view = price_entries(vec![entry("Home kit", 150), entry("Away kit", 20)]).unwrap();

        assert_eq!(view.line_count, 2);
        assert_eq!(view.total_quantity, 170);
        assert_eq!(view.lines[0].tier, Tier::Tier2);
        assert_eq!(view.lines[0].line_total, Decimal::from(90_000));
        assert_eq!(view.lines[1].unit_price, Decimal::from(650));
        assert_eq!(view.subtotal, Decimal::from(90_000 + 13_000));
    }

    #[test]
    fn test_price_entries_empty_cart() {
        let view = price_entries(Vec::new()).unwrap();
        assert_eq!(view.line_count, 0);
        assert_eq!(view.subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_price_entries_names_failing_product() {
        let mut bad = entry("Training tee", 10);
        bad.item.line.quantity = 0;
        let err = price_entries(vec![bad]).unwrap_err();
        assert!(err.to_string().starts_with("Training tee"));
    }
}
