//! Per-run state for a single debt

use chrono::NaiveDate;
use crate::buckets::{
    allocate_payment, distribute_payment, initialize_working_buckets, monthly_interest, settle,
    total_balance, WorkingBucket,
};
use crate::debt::{AllocationStrategy, Debt, DebtId};
use super::schedule::{MonthlyBucketPayment, MonthlyDebtPayment};

/// Mutable copy of a debt owned by one simulation run
#[derive(Debug, Clone)]
pub struct WorkingDebt {
    pub id: DebtId,
    pub name: String,

    /// Running balance
    pub balance: f64,

    /// Regular annual rate in percent
    pub interest_rate: f64,

    pub minimum_payment: f64,

    pub allocation: AllocationStrategy,

    /// Bucket state for bucketed debts, `None` for flat ones
    pub buckets: Option<Vec<WorkingBucket>>,
}

impl WorkingDebt {
    /// Initialize state from a debt at run start
    pub fn from_debt(debt: &Debt, run_start: NaiveDate) -> Self {
        Self {
            id: debt.id,
            name: debt.name.clone(),
            balance: debt.current_balance,
            interest_rate: debt.interest_rate,
            minimum_payment: debt.minimum_payment,
            allocation: debt.allocation_strategy(),
            buckets: initialize_working_buckets(debt, run_start),
        }
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }

    /// Accrue the month's interest and pay the minimum, capped at what is owed
    pub fn pay_minimum(&mut self, date: NaiveDate) -> MonthlyDebtPayment {
        let (payment, principal, interest, bucket_breakdown) = match self.buckets.as_mut() {
            Some(buckets) => {
                let allocation = allocate_payment(
                    buckets,
                    self.minimum_payment,
                    self.allocation,
                    self.interest_rate,
                    date,
                );
                self.balance = settle(allocation.remaining_balance);

                let principal = (allocation.applied - allocation.total_interest).max(0.0);
                (allocation.applied, principal, allocation.total_interest, Some(allocation.breakdown))
            }
            None => {
                let interest = monthly_interest(self.balance, self.interest_rate);
                let payment = self.minimum_payment.min(self.balance + interest);
                let principal = payment - interest;
                self.balance = settle((self.balance - principal).max(0.0));
                (payment, principal, interest, None)
            }
        };

        MonthlyDebtPayment {
            debt_id: self.id,
            debt_name: self.name.clone(),
            payment,
            principal,
            interest,
            remaining_balance: self.balance,
            bucket_breakdown,
        }
    }

    /// Apply `amount` as pure principal; returns what was applied and any bucket detail
    pub fn pay_extra(&mut self, amount: f64) -> (f64, Option<Vec<MonthlyBucketPayment>>) {
        match self.buckets.as_mut() {
            Some(buckets) => {
                let distribution = distribute_payment(buckets, amount, self.allocation);
                self.balance = settle(total_balance(buckets));
                (distribution.applied, Some(distribution.payments))
            }
            None => {
                let applied = amount.min(self.balance);
                self.balance = settle(self.balance - applied);
                (applied, None)
            }
        }
    }
}
