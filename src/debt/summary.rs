//! Aggregate statistics over a set of debts

use serde::{Deserialize, Serialize};
use super::data::{Debt, RateBucket};

/// Portfolio-level view of the caller's debts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DebtSummary {
    pub total_debts: usize,
    pub total_balance: f64,
    pub total_original_balance: f64,
    pub total_minimum_payment: f64,
    /// Interest rate weighted by current balance
    pub weighted_average_interest_rate: f64,
    pub total_paid: f64,
    pub percent_paid: f64,
}

impl DebtSummary {
    pub fn from_debts(debts: &[Debt]) -> Self {
        if debts.is_empty() {
            return Self::default();
        }

        let total_balance: f64 = debts.iter().map(|d| d.current_balance).sum();
        let total_original_balance: f64 = debts.iter().map(|d| d.original_balance).sum();
        let total_minimum_payment: f64 = debts.iter().map(|d| d.minimum_payment).sum();

        let weighted_average_interest_rate = if total_balance > 0.0 {
            debts
                .iter()
                .map(|d| d.interest_rate * (d.current_balance / total_balance))
                .sum()
        } else {
            0.0
        };

        let total_paid = total_original_balance - total_balance;
        let percent_paid = if total_original_balance > 0.0 {
            total_paid / total_original_balance * 100.0
        } else {
            0.0
        };

        Self {
            total_debts: debts.len(),
            total_balance,
            total_original_balance,
            total_minimum_payment,
            weighted_average_interest_rate,
            total_paid,
            percent_paid,
        }
    }
}

/// Balance-weighted average rate across a debt's buckets
pub fn weighted_average_rate(buckets: &[RateBucket]) -> f64 {
    let total_balance: f64 = buckets.iter().map(|b| b.balance).sum();
    if total_balance == 0.0 {
        return 0.0;
    }

    buckets
        .iter()
        .map(|b| b.interest_rate * b.balance / total_balance)
        .sum()
}
