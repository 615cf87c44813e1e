//! Month-by-month payoff simulation across all debts

use chrono::{Datelike, Local, Months, NaiveDate};
use crate::buckets::PAYMENT_EPSILON;
use crate::debt::Debt;
use crate::strategy::PayoffStrategy;
use super::schedule::{MonthlyDebtPayment, MonthlyPayoffDetail, PayoffSchedule};
use super::state::WorkingDebt;

/// Simulation safety bound: 50 years
pub const MAX_SIMULATION_MONTHS: u32 = 600;

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct PayoffConfig {
    /// Hard cap on simulated months; the timeline is truncated silently past it
    pub max_months: u32,

    /// Run date; month `m` is dated the first of this month plus `m` months
    pub start_date: NaiveDate,
}

impl Default for PayoffConfig {
    fn default() -> Self {
        Self {
            max_months: MAX_SIMULATION_MONTHS,
            start_date: Local::now().date_naive(),
        }
    }
}

impl PayoffConfig {
    pub fn starting(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            ..Default::default()
        }
    }
}

/// Main payoff engine
#[derive(Debug, Clone, Default)]
pub struct PayoffEngine {
    config: PayoffConfig,
}

impl PayoffEngine {
    pub fn new(config: PayoffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PayoffConfig {
        &self.config
    }

    /// Date of simulation month `month` (1-indexed)
    pub fn month_date(&self, month: u32) -> NaiveDate {
        let first_of_month = self.config.start_date.with_day(1).unwrap_or(self.config.start_date);
        first_of_month
            .checked_add_months(Months::new(month))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Simulate paying off `debts` in the order given by `sorted_debts`
    ///
    /// Every month each debt with a balance pays its minimum, then whatever is
    /// left of the total monthly budget (all minimums plus `extra_payment`)
    /// flows down `sorted_debts` as extra principal until it is spent. The
    /// order is never re-evaluated mid-run. The result is tagged `Custom`;
    /// callers retag it with the strategy that produced the ordering.
    pub fn calculate_payoff_schedule(&self, debts: &[Debt], extra_payment: f64, sorted_debts: &[&Debt]) -> PayoffSchedule {
        let mut working: Vec<WorkingDebt> = sorted_debts
            .iter()
            .map(|d| WorkingDebt::from_debt(d, self.config.start_date))
            .collect();

        let total_minimum: f64 = debts.iter().map(|d| d.minimum_payment).sum();
        let total_monthly_payment = total_minimum + extra_payment;

        let mut timeline: Vec<MonthlyPayoffDetail> = Vec::new();
        let mut total_interest_paid = 0.0;
        let mut month = 0;

        while working.iter().any(|d| !d.is_paid_off()) && month < self.config.max_months {
            month += 1;
            let date = self.month_date(month);
            let mut available = total_monthly_payment;

            // Minimum payments
            let mut rows: Vec<MonthlyDebtPayment> = Vec::with_capacity(working.len());
            for debt in working.iter_mut() {
                if debt.is_paid_off() {
                    rows.push(MonthlyDebtPayment::paid_off(debt.id, &debt.name));
                    continue;
                }

                let row = debt.pay_minimum(date);
                available -= row.payment;
                total_interest_paid += row.interest;
                rows.push(row);
            }

            // Extra payment waterfall, same order as the minimum pass
            for (index, debt) in working.iter_mut().enumerate() {
                if available <= PAYMENT_EPSILON {
                    break;
                }
                if debt.is_paid_off() {
                    continue;
                }

                let amount = available.min(debt.balance);
                let (applied, bucket_payments) = debt.pay_extra(amount);
                available -= applied;

                rows[index] = rows[index].with_extra(applied, debt.balance, bucket_payments.as_deref());
            }

            let detail = MonthlyPayoffDetail::new(month, date, rows);
            let all_paid = detail.total_remaining == 0.0;
            timeline.push(detail);

            if all_paid {
                break;
            }
        }

        if working.iter().any(|d| !d.is_paid_off()) {
            log::warn!(
                "Payoff simulation hit the {}-month cap with balances outstanding; timeline truncated",
                self.config.max_months
            );
        }

        let total_principal_paid = debts.iter().map(|d| d.current_balance).sum();
        let debt_free_date = timeline.last().map_or(self.config.start_date, |row| row.date);

        log::debug!(
            "Simulated {} debts with extra payment {:.2}: {} months, interest {:.2}",
            debts.len(),
            extra_payment,
            month,
            total_interest_paid
        );

        PayoffSchedule {
            strategy: PayoffStrategy::Custom,
            timeline,
            total_months: month,
            total_interest_paid,
            total_principal_paid,
            debt_free_date,
            monthly_payment: total_monthly_payment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::{DebtId, RateBucket};
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine() -> PayoffEngine {
        PayoffEngine::new(PayoffConfig::starting(date(2025, 1, 17)))
    }

    fn run(debts: &[Debt], extra: f64) -> PayoffSchedule {
        let sorted: Vec<&Debt> = debts.iter().collect();
        engine().calculate_payoff_schedule(debts, extra, &sorted)
    }

    #[test]
    fn test_month_dates() {
        let engine = engine();
        assert_eq!(engine.month_date(1), date(2025, 2, 1));
        assert_eq!(engine.month_date(12), date(2026, 1, 1));
    }

    #[test]
    fn test_single_flat_debt_first_month() {
        let debts = vec![Debt::new(1, "Card", 1200.0, 12.0, 100.0)];
        let schedule = run(&debts, 0.0);

        let first = &schedule.timeline[0].debts[0];
        assert_abs_diff_eq!(first.interest, 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.principal, 88.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.remaining_balance, 1112.0, epsilon = 1e-9);

        assert_eq!(schedule.monthly_payment, 100.0);
        assert_eq!(schedule.total_principal_paid, 1200.0);
        assert_eq!(schedule.total_months, 13);
        assert_eq!(schedule.timeline.last().unwrap().total_remaining, 0.0);
        assert_eq!(schedule.debt_free_date, date(2026, 2, 1));
    }

    #[test]
    fn test_empty_debt_list() {
        let schedule = run(&[], 100.0);

        assert!(schedule.timeline.is_empty());
        assert_eq!(schedule.total_months, 0);
        assert_eq!(schedule.total_interest_paid, 0.0);
        assert_eq!(schedule.debt_free_date, date(2025, 1, 17));
    }

    #[test]
    fn test_paid_off_debt_keeps_zero_rows() {
        let debts = vec![
            Debt::new(1, "Small", 30.0, 10.0, 50.0),
            Debt::new(2, "Large", 2000.0, 10.0, 60.0),
        ];
        let schedule = run(&debts, 0.0);

        assert!(schedule.total_months > 2);
        for row in schedule.timeline.iter().skip(1) {
            assert_eq!(row.debts.len(), 2);
            let small = &row.debts[0];
            assert_eq!(small.debt_id, DebtId::Real(1));
            assert_eq!(small.payment, 0.0);
            assert_eq!(small.remaining_balance, 0.0);
        }
    }

    #[test]
    fn test_freed_minimum_rolls_to_next_debt() {
        let debts = vec![
            Debt::new(1, "Small", 30.0, 0.0, 50.0),
            Debt::new(2, "Large", 1000.0, 0.0, 50.0),
        ];
        let schedule = run(&debts, 0.0);

        // Month 1: small takes 30, the unused 20 goes to large
        let month_1 = &schedule.timeline[0];
        assert_eq!(month_1.debts[0].payment, 30.0);
        assert_eq!(month_1.debts[1].payment, 70.0);
        assert_eq!(month_1.total_payment, 100.0);

        // Month 2: large receives the whole budget
        assert_eq!(schedule.timeline[1].debts[1].payment, 100.0);
    }

    #[test]
    fn test_month_cap_truncates() {
        let debts = vec![Debt::new(1, "Underwater", 10_000.0, 24.0, 100.0)];
        let schedule = run(&debts, 0.0);

        assert_eq!(schedule.total_months, MAX_SIMULATION_MONTHS);
        assert_eq!(schedule.timeline.len(), MAX_SIMULATION_MONTHS as usize);
        assert!(!schedule.is_paid_off());
    }

    #[test]
    fn test_payment_splits_into_principal_and_interest() {
        let debts = vec![
            Debt::new(1, "Card", 2500.0, 21.0, 75.0),
            Debt::new(2, "Loan", 4000.0, 7.5, 120.0),
        ];
        let schedule = run(&debts, 150.0);

        for row in &schedule.timeline {
            for debt in &row.debts {
                assert_abs_diff_eq!(debt.payment, debt.principal + debt.interest, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_retroactive_interest_capitalizes_once() {
        let debts = vec![Debt::new(1, "Store card", 1000.0, 20.0, 10.0).with_buckets(vec![
            RateBucket::new(1, "No interest if paid in full", 1000.0, 0.0, date(2025, 2, 1))
                .expiring(date(2025, 7, 15))
                .retroactive(Some(25.0)),
        ])];
        let schedule = run(&debts, 0.0);

        let bucket_row = |month: usize| {
            schedule.timeline[month - 1].debts[0]
                .bucket_breakdown
                .as_ref()
                .unwrap()[0]
                .clone()
        };

        for month in 1..=6 {
            assert_eq!(bucket_row(month).retroactive_interest, 0.0);
            assert_eq!(schedule.timeline[month - 1].total_interest, 0.0);
        }

        let month_7 = bucket_row(7);
        assert!(month_7.promo_expired);
        assert_abs_diff_eq!(month_7.retroactive_interest, 125.0, epsilon = 1e-9);
        assert_eq!(month_7.interest_rate, 25.0);

        let month_8 = bucket_row(8);
        assert!(!month_8.promo_expired);
        assert_eq!(month_8.retroactive_interest, 0.0);
    }

    #[test]
    fn test_extra_breakdown_merges_into_bucket_rows() {
        let debts = vec![Debt::new(1, "Card", 1000.0, 24.0, 40.0).with_buckets(vec![
            RateBucket::new(1, "Promo", 600.0, 0.0, date(2024, 6, 1)),
            RateBucket::new(2, "Purchases", 400.0, 24.0, date(2024, 6, 1)),
        ])];
        let schedule = run(&debts, 200.0);

        let row = &schedule.timeline[0].debts[0];
        let breakdown = row.bucket_breakdown.as_ref().unwrap();
        let paid: f64 = breakdown.iter().map(|b| b.payment).sum();

        assert_abs_diff_eq!(row.payment, 240.0, epsilon = 1e-9);
        assert_abs_diff_eq!(paid, 240.0, epsilon = 1e-9);
        // Purchases: 400 + 8 interest - 240
        assert_abs_diff_eq!(breakdown[1].remaining_balance, 168.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.remaining_balance, 768.0, epsilon = 1e-9);
    }
}
