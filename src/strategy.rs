//! Repayment strategies and the debt orderings they imply

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::debt::{Debt, DebtId};

/// Strategy a payoff schedule was produced under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayoffStrategy {
    /// Smallest balance first
    Snowball,
    /// Highest interest rate first
    Avalanche,
    /// Caller-supplied priority order
    Custom,
    /// Avalanche over a set with some debts merged into one loan
    Consolidation,
    /// Minimums only, no extra payment
    MinimumOnly,
}

impl PayoffStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoffStrategy::Snowball => "snowball",
            PayoffStrategy::Avalanche => "avalanche",
            PayoffStrategy::Custom => "custom",
            PayoffStrategy::Consolidation => "consolidation",
            PayoffStrategy::MinimumOnly => "minimum-only",
        }
    }
}

impl fmt::Display for PayoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoffStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snowball" => Ok(PayoffStrategy::Snowball),
            "avalanche" => Ok(PayoffStrategy::Avalanche),
            "custom" => Ok(PayoffStrategy::Custom),
            "consolidation" => Ok(PayoffStrategy::Consolidation),
            "minimum-only" | "minimum" => Ok(PayoffStrategy::MinimumOnly),
            other => Err(format!("Unknown payoff strategy: {}", other)),
        }
    }
}

/// Ascending current balance; ties keep input order
pub fn sort_by_snowball(debts: &[Debt]) -> Vec<&Debt> {
    let mut sorted: Vec<&Debt> = debts.iter().collect();
    sorted.sort_by(|a, b| a.current_balance.total_cmp(&b.current_balance));
    sorted
}

/// Descending interest rate; ties keep input order
pub fn sort_by_avalanche(debts: &[Debt]) -> Vec<&Debt> {
    let mut sorted: Vec<&Debt> = debts.iter().collect();
    sorted.sort_by(|a, b| b.interest_rate.total_cmp(&a.interest_rate));
    sorted
}

/// Debts named in `priority_order` first, in that order; the rest after, in input order
pub fn sort_by_custom<'a>(debts: &'a [Debt], priority_order: &[DebtId]) -> Vec<&'a Debt> {
    let mut sorted: Vec<&Debt> = debts.iter().collect();
    sorted.sort_by_key(|d| {
        priority_order
            .iter()
            .position(|id| *id == d.id)
            .unwrap_or(usize::MAX)
    });
    sorted
}
