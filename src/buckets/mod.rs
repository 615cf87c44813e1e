//! Rate bucket engine: promotional rates, deferred interest and payment allocation

mod working;
mod allocation;

pub use working::{WorkingBucket, initialize_working_buckets, total_balance, UNBUCKETED_NAME};
pub use allocation::{
    allocate_payment, accrue_interest, distribute_payment, get_effective_rate, sort_buckets,
    months_between, monthly_interest, settle, Allocation, Distribution, EffectiveRate,
    InterestAccrual, PAYMENT_EPSILON,
};
