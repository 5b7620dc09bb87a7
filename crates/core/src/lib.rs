//! Jerseyworks Core - Shared domain library.
//!
//! This crate holds the rules every Jerseyworks component must agree on:
//! - `storefront` - Public catalog, cart and checkout API
//! - `admin` - Back-office API for products, orders and reports
//! - `cli` - Command-line tools for migrations and role management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Enable the `postgres` feature to get `sqlx`
//! encodings for the ID and status types.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, order/payment statuses and roles
//! - [`pricing`] - Three-tier bulk pricing and booking amounts
//! - [`sizes`] - Garment sizes and the default size split
//! - [`cart`] - Cart line merging and customization gating
//! - [`token`] - Bearer token parsing and hashing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod pricing;
pub mod sizes;
pub mod token;
pub mod types;

pub use cart::{CartError, CartLine, Customization, CustomizationOptions};
pub use pricing::{PriceTiers, PricingError, Quote, Tier};
pub use sizes::{Size, SizeDistribution, SizeError};
pub use types::*;
