//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `checkout` - Cart pricing and order placement
//! - `cart` - Building and validating cart lines against store rules

pub mod cart;
pub mod checkout;
