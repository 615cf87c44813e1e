//! Debt and rate bucket records consumed by the payoff engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker for debts the engine synthesizes itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntheticDebt {
    /// Single loan replacing a consolidated subset of debts
    Consolidated,
}

/// Identity of a debt in a simulation
///
/// Real debts carry the caller's numeric id and serialize as a bare number.
/// Synthetic debts serialize as their tag (`"consolidated"`), so an engine
/// generated record can never compare equal to a caller's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DebtId {
    Real(i64),
    Synthetic(SyntheticDebt),
}

impl DebtId {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, DebtId::Synthetic(_))
    }
}

impl From<i64> for DebtId {
    fn from(id: i64) -> Self {
        DebtId::Real(id)
    }
}

impl fmt::Display for DebtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebtId::Real(id) => write!(f, "{}", id),
            DebtId::Synthetic(SyntheticDebt::Consolidated) => write!(f, "consolidated"),
        }
    }
}

/// How a payment is spread across a debt's rate buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationStrategy {
    /// Cheapest balance first
    LowestRateFirst,
    /// Most expensive balance first
    #[default]
    HighestRateFirst,
    /// FIFO by bucket start date
    OldestFirst,
    /// Unrecognized tag: buckets are paid in their stored order
    #[serde(other)]
    Unordered,
}

impl AllocationStrategy {
    /// Parse a strategy tag, falling back to `Unordered` for anything unknown
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "lowest-rate-first" => AllocationStrategy::LowestRateFirst,
            "highest-rate-first" => AllocationStrategy::HighestRateFirst,
            "oldest-first" => AllocationStrategy::OldestFirst,
            _ => AllocationStrategy::Unordered,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStrategy::LowestRateFirst => "lowest-rate-first",
            AllocationStrategy::HighestRateFirst => "highest-rate-first",
            AllocationStrategy::OldestFirst => "oldest-first",
            AllocationStrategy::Unordered => "unordered",
        }
    }
}

/// Kind of balance a rate bucket tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BucketCategory {
    Purchase,
    BalanceTransfer,
    CashAdvance,
    #[default]
    Other,
}

impl BucketCategory {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "purchase" => BucketCategory::Purchase,
            "balance-transfer" => BucketCategory::BalanceTransfer,
            "cash-advance" => BucketCategory::CashAdvance,
            _ => BucketCategory::Other,
        }
    }
}

/// A sub-balance of a debt carrying its own interest rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBucket {
    pub id: i64,

    pub name: String,

    /// Balance at the start of the simulation
    pub balance: f64,

    /// Annual rate in percent while the bucket is active (promo rate if it expires)
    pub interest_rate: f64,

    /// Date the balance was opened; retroactive interest accrues from here
    pub start_date: NaiveDate,

    /// End of the promotional period, if any
    #[serde(default)]
    pub expires_date: Option<NaiveDate>,

    /// Deferred interest is charged on expiry if the balance is not cleared
    #[serde(default)]
    pub is_retroactive: bool,

    /// Rate used for deferred interest; the debt's regular rate when unset
    #[serde(default)]
    pub retroactive_rate: Option<f64>,

    #[serde(default)]
    pub category: BucketCategory,
}

impl RateBucket {
    pub fn new(id: i64, name: impl Into<String>, balance: f64, interest_rate: f64, start_date: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            balance,
            interest_rate,
            start_date,
            expires_date: None,
            is_retroactive: false,
            retroactive_rate: None,
            category: BucketCategory::Other,
        }
    }

    /// Set the promotional expiration date
    pub fn expiring(mut self, expires_date: NaiveDate) -> Self {
        self.expires_date = Some(expires_date);
        self
    }

    /// Mark the bucket as deferred-interest, optionally with its own rate
    pub fn retroactive(mut self, retroactive_rate: Option<f64>) -> Self {
        self.is_retroactive = true;
        self.retroactive_rate = retroactive_rate;
        self
    }

    pub fn with_category(mut self, category: BucketCategory) -> Self {
        self.category = category;
        self
    }

    pub fn is_expired_on(&self, date: NaiveDate) -> bool {
        self.expires_date.is_some_and(|expires| date >= expires)
    }

    /// Days from `date` until the promo ends (negative once past), `None` without a promo
    pub fn days_until_expiration(&self, date: NaiveDate) -> Option<i64> {
        self.expires_date.map(|expires| (expires - date).num_days())
    }
}

/// A single debt as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: DebtId,

    pub name: String,

    pub original_balance: f64,

    pub current_balance: f64,

    /// Annual interest rate in percent
    pub interest_rate: f64,

    pub minimum_payment: f64,

    /// Bill record this debt is paid through, if any
    #[serde(default)]
    pub linked_bill_id: Option<i64>,

    #[serde(default)]
    pub priority: Option<u32>,

    /// Bucket allocation; highest-rate-first when unset
    #[serde(default)]
    pub payment_allocation_strategy: Option<AllocationStrategy>,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub rate_buckets: Vec<RateBucket>,
}

impl Debt {
    /// Create a flat debt whose original balance equals its current balance
    pub fn new(id: i64, name: impl Into<String>, balance: f64, interest_rate: f64, minimum_payment: f64) -> Self {
        Self {
            id: DebtId::Real(id),
            name: name.into(),
            original_balance: balance,
            current_balance: balance,
            interest_rate,
            minimum_payment,
            linked_bill_id: None,
            priority: None,
            payment_allocation_strategy: None,
            notes: None,
            rate_buckets: Vec::new(),
        }
    }

    pub fn with_original_balance(mut self, original_balance: f64) -> Self {
        self.original_balance = original_balance;
        self
    }

    pub fn with_buckets(mut self, buckets: Vec<RateBucket>) -> Self {
        self.rate_buckets = buckets;
        self
    }

    pub fn with_allocation(mut self, strategy: AllocationStrategy) -> Self {
        self.payment_allocation_strategy = Some(strategy);
        self
    }

    pub fn allocation_strategy(&self) -> AllocationStrategy {
        self.payment_allocation_strategy.unwrap_or_default()
    }

    pub fn has_rate_buckets(&self) -> bool {
        !self.rate_buckets.is_empty()
    }

    pub fn bucket_total(&self) -> f64 {
        self.rate_buckets.iter().map(|b| b.balance).sum()
    }
}
