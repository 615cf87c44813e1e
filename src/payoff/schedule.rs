//! Timeline output structures for payoff simulations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::debt::DebtId;
use crate::strategy::PayoffStrategy;

/// One bucket's share of a debt's payment in a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucketPayment {
    /// `None` for the part of the debt not covered by an explicit bucket
    pub bucket_id: Option<i64>,
    pub bucket_name: String,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub remaining_balance: f64,
    /// Annual rate in force this month
    pub interest_rate: f64,
    /// Set only in the month the promotional rate ended
    pub promo_expired: bool,
    /// Deferred interest capitalized this month
    pub retroactive_interest: f64,
}

impl MonthlyBucketPayment {
    /// Fold a later payment against the same bucket into this entry
    pub fn combine(&self, later: &MonthlyBucketPayment) -> MonthlyBucketPayment {
        MonthlyBucketPayment {
            payment: self.payment + later.payment,
            principal: self.principal + later.principal,
            remaining_balance: later.remaining_balance,
            ..self.clone()
        }
    }
}

/// Merge `later` bucket payments into `base`, matching entries by bucket id
pub fn merge_bucket_payments(base: &[MonthlyBucketPayment], later: &[MonthlyBucketPayment]) -> Vec<MonthlyBucketPayment> {
    let mut merged: Vec<MonthlyBucketPayment> = base
        .iter()
        .map(|entry| match later.iter().find(|l| l.bucket_id == entry.bucket_id) {
            Some(l) => entry.combine(l),
            None => entry.clone(),
        })
        .collect();

    merged.extend(
        later
            .iter()
            .filter(|l| !base.iter().any(|b| b.bucket_id == l.bucket_id))
            .cloned(),
    );

    merged
}

/// One debt's activity in a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDebtPayment {
    pub debt_id: DebtId,
    pub debt_name: String,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub remaining_balance: f64,
    /// Per-bucket detail for debts carrying rate buckets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_breakdown: Option<Vec<MonthlyBucketPayment>>,
}

impl MonthlyDebtPayment {
    /// Row for a debt that is already paid off
    pub fn paid_off(debt_id: DebtId, debt_name: &str) -> Self {
        Self {
            debt_id,
            debt_name: debt_name.to_string(),
            payment: 0.0,
            principal: 0.0,
            interest: 0.0,
            remaining_balance: 0.0,
            bucket_breakdown: None,
        }
    }

    /// New row with an extra principal payment applied on top of this one
    pub fn with_extra(
        &self,
        extra: f64,
        remaining_balance: f64,
        extra_buckets: Option<&[MonthlyBucketPayment]>,
    ) -> MonthlyDebtPayment {
        let bucket_breakdown = match (&self.bucket_breakdown, extra_buckets) {
            (Some(base), Some(later)) => Some(merge_bucket_payments(base, later)),
            (base, _) => base.clone(),
        };

        MonthlyDebtPayment {
            debt_id: self.debt_id,
            debt_name: self.debt_name.clone(),
            payment: self.payment + extra,
            principal: self.principal + extra,
            interest: self.interest,
            remaining_balance,
            bucket_breakdown,
        }
    }
}

/// All debts for one month of the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPayoffDetail {
    pub month: u32,
    pub date: NaiveDate,
    pub debts: Vec<MonthlyDebtPayment>,
    pub total_payment: f64,
    pub total_interest: f64,
    pub total_remaining: f64,
}

impl MonthlyPayoffDetail {
    pub fn new(month: u32, date: NaiveDate, debts: Vec<MonthlyDebtPayment>) -> Self {
        let total_payment = debts.iter().map(|d| d.payment).sum();
        let total_interest = debts.iter().map(|d| d.interest).sum();
        let total_remaining = debts.iter().map(|d| d.remaining_balance).sum();

        Self {
            month,
            date,
            debts,
            total_payment,
            total_interest,
            total_remaining,
        }
    }
}

/// Month a debt was cleared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayoff {
    pub debt_id: DebtId,
    pub debt_name: String,
    pub month: u32,
    pub date: NaiveDate,
}

/// Complete payoff schedule for one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffSchedule {
    pub strategy: PayoffStrategy,
    pub timeline: Vec<MonthlyPayoffDetail>,
    pub total_months: u32,
    pub total_interest_paid: f64,
    pub total_principal_paid: f64,
    pub debt_free_date: NaiveDate,
    /// Minimums plus extra, paid every month
    pub monthly_payment: f64,
}

impl PayoffSchedule {
    /// Same schedule under a different strategy tag
    pub fn tagged(self, strategy: PayoffStrategy) -> Self {
        Self { strategy, ..self }
    }

    /// Debts in the order they were cleared
    ///
    /// Debts still carrying a balance when the timeline ends are omitted.
    pub fn payoff_order(&self) -> Vec<DebtPayoff> {
        let Some(first) = self.timeline.first() else {
            return Vec::new();
        };

        let mut payoffs: Vec<DebtPayoff> = first
            .debts
            .iter()
            .filter_map(|debt| {
                self.timeline.iter().find_map(|row| {
                    row.debts
                        .iter()
                        .find(|d| d.debt_id == debt.debt_id && d.remaining_balance <= 0.0)
                        .map(|d| DebtPayoff {
                            debt_id: d.debt_id,
                            debt_name: d.debt_name.clone(),
                            month: row.month,
                            date: row.date,
                        })
                })
            })
            .collect();

        payoffs.sort_by_key(|p| p.month);
        payoffs
    }

    /// Whether every balance reached zero before the timeline ended
    pub fn is_paid_off(&self) -> bool {
        self.timeline.last().map_or(true, |row| row.total_remaining <= 0.0)
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            strategy: self.strategy,
            total_months: self.total_months,
            total_interest_paid: self.total_interest_paid,
            total_principal_paid: self.total_principal_paid,
            total_paid: self.total_interest_paid + self.total_principal_paid,
            monthly_payment: self.monthly_payment,
            debt_free_date: self.debt_free_date,
        }
    }
}

/// Headline numbers for a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub strategy: PayoffStrategy,
    pub total_months: u32,
    pub total_interest_paid: f64,
    pub total_principal_paid: f64,
    pub total_paid: f64,
    pub monthly_payment: f64,
    pub debt_free_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket_entry(id: i64, payment: f64, remaining: f64) -> MonthlyBucketPayment {
        MonthlyBucketPayment {
            bucket_id: Some(id),
            bucket_name: format!("Bucket {}", id),
            payment,
            principal: payment,
            interest: 1.5,
            remaining_balance: remaining,
            interest_rate: 18.0,
            promo_expired: false,
            retroactive_interest: 0.0,
        }
    }

    #[test]
    fn test_merge_bucket_payments() {
        let base = vec![bucket_entry(1, 20.0, 80.0), bucket_entry(2, 0.0, 50.0)];
        let later = vec![bucket_entry(2, 50.0, 0.0)];

        let merged = merge_bucket_payments(&base, &later);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], base[0]);
        assert_eq!(merged[1].payment, 50.0);
        assert_eq!(merged[1].remaining_balance, 0.0);
        // Interest comes from the first pass only
        assert_eq!(merged[1].interest, 1.5);
        // Inputs are left untouched
        assert_eq!(base[1].payment, 0.0);
    }

    #[test]
    fn test_with_extra_builds_new_row() {
        let row = MonthlyDebtPayment {
            debt_id: DebtId::Real(1),
            debt_name: "Card".to_string(),
            payment: 100.0,
            principal: 88.0,
            interest: 12.0,
            remaining_balance: 1112.0,
            bucket_breakdown: None,
        };

        let combined = row.with_extra(50.0, 1062.0, None);

        assert_eq!(combined.payment, 150.0);
        assert_eq!(combined.principal, 138.0);
        assert_eq!(combined.interest, 12.0);
        assert_eq!(combined.remaining_balance, 1062.0);
        assert_eq!(row.payment, 100.0);
    }

    #[test]
    fn test_month_totals() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let detail = MonthlyPayoffDetail::new(
            1,
            date,
            vec![
                MonthlyDebtPayment::paid_off(DebtId::Real(1), "Card"),
                MonthlyDebtPayment {
                    debt_id: DebtId::Real(2),
                    debt_name: "Loan".to_string(),
                    payment: 75.0,
                    principal: 70.0,
                    interest: 5.0,
                    remaining_balance: 430.0,
                    bucket_breakdown: None,
                },
            ],
        );

        assert_eq!(detail.total_payment, 75.0);
        assert_eq!(detail.total_interest, 5.0);
        assert_eq!(detail.total_remaining, 430.0);
    }
}
