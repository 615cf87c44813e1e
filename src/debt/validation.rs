//! Boundary checks applied before a simulation runs
//!
//! The engine trusts its input; callers run these first and reject the
//! request on error.

use thiserror::Error;
use super::data::{Debt, DebtId};

/// Tolerance when comparing bucket totals against the debt balance
const BUCKET_TOLERANCE: f64 = 0.005;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("No debts to calculate")]
    NoDebts,

    #[error("Extra payment must be non-negative, got {0}")]
    NegativeExtraPayment(f64),

    #[error("Debt {id} has a negative balance ({balance})")]
    NegativeBalance { id: DebtId, balance: f64 },

    #[error("Debt {id} interest rate {rate} is outside [0, 100]")]
    InterestRateOutOfRange { id: DebtId, rate: f64 },

    #[error("Debt {id} has a negative minimum payment ({payment})")]
    NegativeMinimumPayment { id: DebtId, payment: f64 },

    #[error("Total rate bucket balance (${bucket_total:.2}) exceeds debt balance (${balance:.2})")]
    BucketsExceedBalance { id: DebtId, bucket_total: f64, balance: f64 },

    #[error("Consolidation references unknown debt {0}")]
    UnknownDebt(DebtId),
}

/// Check a single debt and its rate buckets
pub fn validate_debt(debt: &Debt) -> Result<(), ValidationError> {
    if debt.current_balance < 0.0 {
        return Err(ValidationError::NegativeBalance { id: debt.id, balance: debt.current_balance });
    }

    if !(0.0..=100.0).contains(&debt.interest_rate) {
        return Err(ValidationError::InterestRateOutOfRange { id: debt.id, rate: debt.interest_rate });
    }

    if debt.minimum_payment < 0.0 {
        return Err(ValidationError::NegativeMinimumPayment { id: debt.id, payment: debt.minimum_payment });
    }

    validate_rate_buckets(debt)
}

/// Reject buckets whose combined balance is larger than the debt itself
pub fn validate_rate_buckets(debt: &Debt) -> Result<(), ValidationError> {
    let bucket_total = debt.bucket_total();
    if bucket_total > debt.current_balance + BUCKET_TOLERANCE {
        return Err(ValidationError::BucketsExceedBalance {
            id: debt.id,
            bucket_total,
            balance: debt.current_balance,
        });
    }
    Ok(())
}

/// Check a whole request: non-empty debt set, sane extra payment, valid debts
pub fn validate_debts(debts: &[Debt], extra_payment: f64) -> Result<(), ValidationError> {
    if debts.is_empty() {
        return Err(ValidationError::NoDebts);
    }

    if extra_payment < 0.0 {
        return Err(ValidationError::NegativeExtraPayment(extra_payment));
    }

    debts.iter().try_for_each(validate_debt)
}

/// Every id in `ids` must name one of `debts`
pub fn validate_known_ids(debts: &[Debt], ids: &[DebtId]) -> Result<(), ValidationError> {
    match ids.iter().find(|id| !debts.iter().any(|d| d.id == **id)) {
        Some(id) => Err(ValidationError::UnknownDebt(*id)),
        None => Ok(()),
    }
}
