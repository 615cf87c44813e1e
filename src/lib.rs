//! Debt Payoff - month-by-month debt payoff simulation and strategy comparison
//!
//! This library provides:
//! - Payoff timelines under snowball, avalanche and custom priority orders
//! - Rate buckets: promotional balances with expiry and deferred interest
//! - Extra-payment waterfalls across debts and across a debt's buckets
//! - Strategy comparison against a minimum-payments baseline, with a recommendation
//! - Consolidation modeling

pub mod debt;
pub mod buckets;
pub mod payoff;
pub mod strategy;
pub mod comparison;
pub mod consolidation;

// Re-export commonly used types
pub use debt::{Debt, DebtId, RateBucket, AllocationStrategy, DebtSummary};
pub use payoff::{PayoffEngine, PayoffConfig, PayoffSchedule, MonthlyPayoffDetail};
pub use strategy::PayoffStrategy;
pub use comparison::{StrategyRunner, StrategyComparison, PayoffCalculationInput, Recommendation, get_recommended_strategy};
pub use consolidation::{ConsolidationInput, ConsolidationResult};
