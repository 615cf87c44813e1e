//! Debt records, boundary validation and loading

mod data;
mod summary;
pub mod loader;
pub mod validation;

pub use data::{AllocationStrategy, BucketCategory, Debt, DebtId, RateBucket, SyntheticDebt};
pub use summary::{DebtSummary, weighted_average_rate};
pub use loader::{load_debts, load_debts_from_reader, load_request};
pub use validation::{ValidationError, validate_debts};
