//! Payoff simulation engine

mod state;
mod engine;
mod schedule;

pub use state::WorkingDebt;
pub use engine::{PayoffEngine, PayoffConfig, MAX_SIMULATION_MONTHS};
pub use schedule::{
    merge_bucket_payments, DebtPayoff, MonthlyBucketPayment, MonthlyDebtPayment,
    MonthlyPayoffDetail, PayoffSchedule, ScheduleSummary,
};
