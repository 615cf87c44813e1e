//! Consolidation modeling: replace several debts with one loan and compare

use serde::{Deserialize, Serialize};
use crate::comparison::StrategyRunner;
use crate::debt::{Debt, DebtId, SyntheticDebt};
use crate::payoff::PayoffSchedule;
use crate::strategy::PayoffStrategy;

/// Floor for the consolidated loan's default minimum payment
pub const CONSOLIDATED_MINIMUM_FLOOR: f64 = 50.0;

/// Default minimum payment as a share of the consolidated balance
pub const CONSOLIDATED_MINIMUM_RATE: f64 = 0.02;

/// Which debts to merge, and the new loan's terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationInput {
    pub debt_ids: Vec<DebtId>,

    /// Annual rate of the new loan in percent
    pub new_interest_rate: f64,

    /// Defaults to the larger of $50 and 2% of the balance
    #[serde(default)]
    pub new_minimum_payment: Option<f64>,
}

/// Difference versus avalanche on the unconsolidated debts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationSavings {
    pub interest_saved: f64,
    pub months_saved: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationResult {
    /// Debts folded into the new loan
    pub original_debts: Vec<Debt>,
    pub consolidated_balance: f64,
    pub new_interest_rate: f64,
    pub new_minimum_payment: f64,
    pub payoff_schedule: PayoffSchedule,
    pub savings: ConsolidationSavings,
}

/// Build the single loan that replaces `selected`
pub fn consolidated_debt(selected: &[&Debt], input: &ConsolidationInput) -> Debt {
    let balance: f64 = selected.iter().map(|d| d.current_balance).sum();
    let minimum_payment = input
        .new_minimum_payment
        .filter(|p| *p > 0.0)
        .unwrap_or_else(|| CONSOLIDATED_MINIMUM_FLOOR.max(balance * CONSOLIDATED_MINIMUM_RATE));

    Debt {
        id: DebtId::Synthetic(SyntheticDebt::Consolidated),
        name: "Consolidated Loan".to_string(),
        original_balance: balance,
        current_balance: balance,
        interest_rate: input.new_interest_rate,
        minimum_payment,
        linked_bill_id: None,
        priority: None,
        payment_allocation_strategy: None,
        notes: Some("Consolidated debt".to_string()),
        rate_buckets: Vec::new(),
    }
}

impl StrategyRunner {
    /// Avalanche over the debts with `input.debt_ids` merged into one loan,
    /// against avalanche over the original set at the same extra payment
    pub fn consolidate(&self, debts: &[Debt], input: &ConsolidationInput, extra_payment: f64) -> ConsolidationResult {
        let (selected, untouched): (Vec<&Debt>, Vec<&Debt>) =
            debts.iter().partition(|d| input.debt_ids.contains(&d.id));

        let loan = consolidated_debt(&selected, input);
        let consolidated_balance = loan.current_balance;
        let new_minimum_payment = loan.minimum_payment;

        let mut combined: Vec<Debt> = untouched.into_iter().cloned().collect();
        combined.push(loan);

        let (consolidated, original) = rayon::join(
            || self.avalanche(&combined, extra_payment),
            || self.avalanche(debts, extra_payment),
        );

        let savings = ConsolidationSavings {
            interest_saved: original.total_interest_paid - consolidated.total_interest_paid,
            months_saved: original.total_months as i64 - consolidated.total_months as i64,
        };

        log::debug!(
            "Consolidated {} debts ({:.2}) at {:.2}%: interest saved {:.2}, months saved {}",
            selected.len(),
            consolidated_balance,
            input.new_interest_rate,
            savings.interest_saved,
            savings.months_saved
        );

        ConsolidationResult {
            original_debts: selected.into_iter().cloned().collect(),
            consolidated_balance,
            new_interest_rate: input.new_interest_rate,
            new_minimum_payment,
            payoff_schedule: consolidated.tagged(PayoffStrategy::Consolidation),
            savings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::PayoffConfig;
    use chrono::NaiveDate;

    fn runner() -> StrategyRunner {
        StrategyRunner::with_config(PayoffConfig::starting(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()))
    }

    fn debts() -> Vec<Debt> {
        vec![
            Debt::new(1, "Visa", 4000.0, 24.99, 120.0),
            Debt::new(2, "Mastercard", 2500.0, 21.5, 75.0),
            Debt::new(3, "Auto", 12000.0, 5.9, 310.0),
        ]
    }

    fn input(new_minimum_payment: Option<f64>) -> ConsolidationInput {
        ConsolidationInput {
            debt_ids: vec![DebtId::Real(1), DebtId::Real(2)],
            new_interest_rate: 11.0,
            new_minimum_payment,
        }
    }

    #[test]
    fn test_default_minimum_payment() {
        let debts = debts();
        let selected: Vec<&Debt> = debts.iter().take(2).collect();

        let loan = consolidated_debt(&selected, &input(None));
        assert_eq!(loan.current_balance, 6500.0);
        assert_eq!(loan.minimum_payment, 130.0);
        assert!(loan.id.is_synthetic());

        let small = [&debts[1]];
        let small_input = ConsolidationInput { debt_ids: vec![DebtId::Real(2)], ..input(None) };
        let tiny = Debt::new(9, "Tiny", 800.0, 20.0, 25.0);
        assert_eq!(consolidated_debt(&[&tiny], &small_input).minimum_payment, 50.0);
        assert_eq!(consolidated_debt(&small, &small_input).minimum_payment, 50.0);

        assert_eq!(consolidated_debt(&selected, &input(Some(200.0))).minimum_payment, 200.0);
    }

    #[test]
    fn test_consolidation_replaces_selected_debts() {
        let debts = debts();
        let result = runner().consolidate(&debts, &input(Some(200.0)), 100.0);

        assert_eq!(result.original_debts.len(), 2);
        assert_eq!(result.consolidated_balance, 6500.0);
        assert_eq!(result.new_minimum_payment, 200.0);
        assert_eq!(result.payoff_schedule.strategy, PayoffStrategy::Consolidation);

        let first_month = &result.payoff_schedule.timeline[0];
        assert_eq!(first_month.debts.len(), 2);
        // Avalanche order: the 11% loan ahead of the 5.9% auto loan
        assert_eq!(first_month.debts[0].debt_id, DebtId::Synthetic(SyntheticDebt::Consolidated));
        assert_eq!(first_month.debts[1].debt_id, DebtId::Real(3));
    }

    #[test]
    fn test_savings_against_original_avalanche() {
        let debts = debts();
        let runner = runner();
        let result = runner.consolidate(&debts, &input(Some(195.0)), 100.0);
        let original = runner.avalanche(&debts, 100.0);

        assert!(
            (result.savings.interest_saved
                - (original.total_interest_paid - result.payoff_schedule.total_interest_paid))
                .abs()
                < 1e-9
        );
        assert_eq!(
            result.savings.months_saved,
            original.total_months as i64 - result.payoff_schedule.total_months as i64
        );
        // Same monthly budget at a far lower rate
        assert!(result.savings.interest_saved > 0.0);
    }

    #[test]
    fn test_caller_debts_untouched() {
        let debts = debts();
        let before = debts.clone();
        let _ = runner().consolidate(&debts, &input(None), 50.0);
        assert_eq!(debts, before);
    }
}
