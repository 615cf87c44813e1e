//! Per-run mutable bucket state

use chrono::NaiveDate;
use crate::debt::{Debt, RateBucket};
use super::allocation::PAYMENT_EPSILON;

/// Name given to the part of a debt's balance no bucket covers
pub const UNBUCKETED_NAME: &str = "Standard balance";

/// A rate bucket snapshot owned by a single simulation run
///
/// Created from the caller's [`RateBucket`] at run start and never written
/// back. Tracks the running balance and the rate currently in force, which
/// changes when a promotional period ends.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingBucket {
    /// Source bucket id; `None` for the uncovered remainder of the debt
    pub id: Option<i64>,
    pub name: String,

    /// Nominal (promotional) annual rate in percent
    pub interest_rate: f64,
    pub start_date: NaiveDate,
    pub expires_date: Option<NaiveDate>,
    pub is_retroactive: bool,
    pub retroactive_rate: Option<f64>,

    /// Running balance
    pub balance: f64,

    /// Annual rate in force this month
    pub current_rate: f64,

    /// Whether the promo had already ended as of the last refresh
    pub has_expired: bool,

    /// Balance at run start, the base for deferred interest
    pub initial_balance: f64,
}

impl WorkingBucket {
    pub fn from_bucket(bucket: &RateBucket) -> Self {
        Self {
            id: Some(bucket.id),
            name: bucket.name.clone(),
            interest_rate: bucket.interest_rate,
            start_date: bucket.start_date,
            expires_date: bucket.expires_date,
            is_retroactive: bucket.is_retroactive,
            retroactive_rate: bucket.retroactive_rate,
            balance: bucket.balance,
            current_rate: bucket.interest_rate,
            has_expired: false,
            initial_balance: bucket.balance,
        }
    }

    /// Bucket holding the balance left over after the explicit buckets, at the debt's regular rate
    fn unbucketed(balance: f64, regular_rate: f64, start_date: NaiveDate) -> Self {
        Self {
            id: None,
            name: UNBUCKETED_NAME.to_string(),
            interest_rate: regular_rate,
            start_date,
            expires_date: None,
            is_retroactive: false,
            retroactive_rate: None,
            balance,
            current_rate: regular_rate,
            has_expired: false,
            initial_balance: balance,
        }
    }
}

/// Build the working bucket list for a debt, `None` for flat debts
///
/// Any part of the debt's current balance not covered by its buckets is
/// carried as an extra bucket at the regular rate so the debt balance is
/// conserved.
pub fn initialize_working_buckets(debt: &Debt, run_start: NaiveDate) -> Option<Vec<WorkingBucket>> {
    if !debt.has_rate_buckets() {
        return None;
    }

    let mut buckets: Vec<WorkingBucket> = debt.rate_buckets.iter().map(WorkingBucket::from_bucket).collect();

    let uncovered = debt.current_balance - debt.bucket_total();
    if uncovered > PAYMENT_EPSILON {
        buckets.push(WorkingBucket::unbucketed(uncovered, debt.interest_rate, run_start));
    }

    Some(buckets)
}

/// Sum of running balances
pub fn total_balance(buckets: &[WorkingBucket]) -> f64 {
    buckets.iter().map(|b| b.balance).sum()
}
