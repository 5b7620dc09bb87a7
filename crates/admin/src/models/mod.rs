//! Domain models for the back-office API.

pub mod catalog;
pub mod order;
pub mod report;
pub mod session;
pub mod settings;
pub mod user;

pub use catalog::{Category, CategoryInput, Product, ProductInput};
pub use order::{AdminOrder, OrderDetail, OrderItem, PaymentRecord, StatusUpdate};
pub use report::{MonthRevenue, ReportSummary, StatusCount, TopProduct};
pub use session::CurrentAdmin;
pub use settings::{SettingEntry, StoreSettings};
pub use user::UserSummary;
