//! Strategy runner: runs the payoff engine once per strategy and compares results
//!
//! Every run works on its own copies of the debts, so the strategies inside a
//! comparison are simulated in parallel.

use serde::{Deserialize, Serialize};
use crate::consolidation::{ConsolidationInput, ConsolidationResult};
use crate::debt::validation::{validate_debts, validate_known_ids, ValidationError};
use crate::debt::{Debt, DebtId, SyntheticDebt};
use crate::payoff::{PayoffConfig, PayoffEngine, PayoffSchedule};
use crate::strategy::{sort_by_avalanche, sort_by_custom, sort_by_snowball, PayoffStrategy};

/// Interest avalanche must save over snowball to be recommended outright
pub const AVALANCHE_INTEREST_THRESHOLD: f64 = 500.0;

/// Months avalanche must save over snowball to be recommended outright
pub const AVALANCHE_MONTHS_THRESHOLD: i64 = 3;

/// Interest gap under which snowball's quick wins are preferred
pub const SNOWBALL_INTEREST_MARGIN: f64 = 100.0;

/// A full calculation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffCalculationInput {
    pub debts: Vec<Debt>,

    /// Paid on top of all minimums every month
    #[serde(default)]
    pub extra_monthly_payment: f64,

    #[serde(default)]
    pub custom_priority_order: Option<Vec<DebtId>>,

    #[serde(default)]
    pub consolidation_input: Option<ConsolidationInput>,
}

impl PayoffCalculationInput {
    pub fn new(debts: Vec<Debt>, extra_monthly_payment: f64) -> Self {
        Self {
            debts,
            extra_monthly_payment,
            custom_priority_order: None,
            consolidation_input: None,
        }
    }

    /// Reject the request before any simulation runs
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_debts(&self.debts, self.extra_monthly_payment)?;

        if let Some(consolidation) = &self.consolidation_input {
            validate_known_ids(&self.debts, &consolidation.debt_ids)?;
            if !(0.0..=100.0).contains(&consolidation.new_interest_rate) {
                return Err(ValidationError::InterestRateOutOfRange {
                    id: DebtId::Synthetic(SyntheticDebt::Consolidated),
                    rate: consolidation.new_interest_rate,
                });
            }
        }

        Ok(())
    }

    fn custom_order(&self) -> Option<&[DebtId]> {
        self.custom_priority_order.as_deref()
    }
}

/// Schedules for every strategy requested in one comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub snowball: PayoffSchedule,
    pub avalanche: PayoffSchedule,
    /// Baseline: minimum payments only
    pub minimum_only: PayoffSchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<PayoffSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consolidation: Option<ConsolidationResult>,
}

/// Recommended strategy with a human-readable justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub strategy: PayoffStrategy,
    pub reason: String,
}

/// Runs the payoff engine for each strategy
///
/// # Example
/// ```ignore
/// let runner = StrategyRunner::new();
/// let comparison = runner.compare_strategies(&debts, 200.0, None, None);
/// let recommended = get_recommended_strategy(&comparison);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StrategyRunner {
    engine: PayoffEngine,
}

impl StrategyRunner {
    /// Runner starting from today with the default month cap
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PayoffConfig) -> Self {
        Self {
            engine: PayoffEngine::new(config),
        }
    }

    pub fn engine(&self) -> &PayoffEngine {
        &self.engine
    }

    /// Smallest balance first
    pub fn snowball(&self, debts: &[Debt], extra_payment: f64) -> PayoffSchedule {
        let sorted = sort_by_snowball(debts);
        self.engine
            .calculate_payoff_schedule(debts, extra_payment, &sorted)
            .tagged(PayoffStrategy::Snowball)
    }

    /// Highest interest rate first
    pub fn avalanche(&self, debts: &[Debt], extra_payment: f64) -> PayoffSchedule {
        let sorted = sort_by_avalanche(debts);
        self.engine
            .calculate_payoff_schedule(debts, extra_payment, &sorted)
            .tagged(PayoffStrategy::Avalanche)
    }

    /// Caller's priority order
    pub fn custom(&self, debts: &[Debt], extra_payment: f64, priority_order: &[DebtId]) -> PayoffSchedule {
        let sorted = sort_by_custom(debts, priority_order);
        self.engine
            .calculate_payoff_schedule(debts, extra_payment, &sorted)
            .tagged(PayoffStrategy::Custom)
    }

    /// Baseline with no extra payment; order is irrelevant
    pub fn minimum_only(&self, debts: &[Debt]) -> PayoffSchedule {
        let sorted: Vec<&Debt> = debts.iter().collect();
        self.engine
            .calculate_payoff_schedule(debts, 0.0, &sorted)
            .tagged(PayoffStrategy::MinimumOnly)
    }

    /// Schedule for a single strategy of a request
    ///
    /// `None` for consolidation when the request carries no consolidation input.
    pub fn schedule_for(&self, strategy: PayoffStrategy, input: &PayoffCalculationInput) -> Option<PayoffSchedule> {
        let debts = &input.debts;
        let extra = input.extra_monthly_payment;

        match strategy {
            PayoffStrategy::Snowball => Some(self.snowball(debts, extra)),
            PayoffStrategy::Avalanche => Some(self.avalanche(debts, extra)),
            PayoffStrategy::Custom => Some(self.custom(debts, extra, input.custom_order().unwrap_or(&[]))),
            PayoffStrategy::MinimumOnly => Some(self.minimum_only(debts)),
            PayoffStrategy::Consolidation => input
                .consolidation_input
                .as_ref()
                .map(|c| self.consolidate(debts, c, extra).payoff_schedule),
        }
    }

    /// Run snowball, avalanche and the minimum-only baseline, plus custom and
    /// consolidation when requested
    pub fn compare_strategies(
        &self,
        debts: &[Debt],
        extra_payment: f64,
        custom_priority_order: Option<&[DebtId]>,
        consolidation_input: Option<&ConsolidationInput>,
    ) -> StrategyComparison {
        let ((snowball, avalanche), minimum_only) = rayon::join(
            || {
                rayon::join(
                    || self.snowball(debts, extra_payment),
                    || self.avalanche(debts, extra_payment),
                )
            },
            || self.minimum_only(debts),
        );

        let (custom, consolidation) = rayon::join(
            || {
                custom_priority_order
                    .filter(|order| !order.is_empty())
                    .map(|order| self.custom(debts, extra_payment, order))
            },
            || consolidation_input.map(|input| self.consolidate(debts, input, extra_payment)),
        );

        log::debug!(
            "Compared strategies for {} debts: snowball {} months, avalanche {} months",
            debts.len(),
            snowball.total_months,
            avalanche.total_months
        );

        StrategyComparison {
            snowball,
            avalanche,
            minimum_only,
            custom,
            consolidation,
        }
    }

    /// Compare every strategy a request asks for
    pub fn compare(&self, input: &PayoffCalculationInput) -> StrategyComparison {
        self.compare_strategies(
            &input.debts,
            input.extra_monthly_payment,
            input.custom_order(),
            input.consolidation_input.as_ref(),
        )
    }
}

/// Pick between snowball and avalanche
///
/// First match wins: avalanche when it saves more than $500 or more than 3
/// months; snowball when it is faster or the interest gap is under $100;
/// avalanche otherwise.
pub fn get_recommended_strategy(comparison: &StrategyComparison) -> Recommendation {
    let snowball = &comparison.snowball;
    let avalanche = &comparison.avalanche;

    let interest_diff = snowball.total_interest_paid - avalanche.total_interest_paid;
    let time_diff = snowball.total_months as i64 - avalanche.total_months as i64;

    if interest_diff > AVALANCHE_INTEREST_THRESHOLD || time_diff > AVALANCHE_MONTHS_THRESHOLD {
        return Recommendation {
            strategy: PayoffStrategy::Avalanche,
            reason: format!(
                "Saves ${:.2} in interest and {} months compared to snowball method.",
                interest_diff, time_diff
            ),
        };
    }

    if time_diff < 0 || interest_diff.abs() < SNOWBALL_INTEREST_MARGIN {
        return Recommendation {
            strategy: PayoffStrategy::Snowball,
            reason: "Provides psychological wins by paying off debts faster, with minimal difference in total interest."
                .to_string(),
        };
    }

    Recommendation {
        strategy: PayoffStrategy::Avalanche,
        reason: "Most mathematically efficient method, minimizing total interest paid.".to_string(),
    }
}
