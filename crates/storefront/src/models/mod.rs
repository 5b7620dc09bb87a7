//! Domain models for the storefront API.
//!
//! These are the shapes handlers return as JSON. Database row types stay
//! private to the `db` modules and convert into these.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod session;

pub use account::{Address, AddressInput, Profile};
pub use cart::{CartEntry, CartItem, CartView, PricedCartLine};
pub use catalog::{Category, CategoryDetail, Product, ProductDetail};
pub use order::{Order, OrderDetail, OrderItem, PaymentRecord, StatusUpdate};
pub use session::CurrentUser;
