//! Business logic services for the back office.
//!
//! # Services
//!
//! - `catalog` - In-memory product filtering and sorting
//! - `orders` - Order filtering plus the status and payment transactions
//! - `reports` - Sales report aggregation

pub mod catalog;
pub mod orders;
pub mod reports;

pub use orders::{OrderQuery, OrderService, OrderServiceError};
