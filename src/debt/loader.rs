//! Load debts from CSV tables or a JSON calculation request

use super::{AllocationStrategy, BucketCategory, Debt, DebtId, RateBucket};
use crate::comparison::PayoffCalculationInput;
use chrono::NaiveDate;
use csv::Reader;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Raw row of a debts CSV
#[derive(Debug, serde::Deserialize)]
struct DebtCsvRow {
    id: i64,
    name: String,
    original_balance: Option<f64>,
    current_balance: f64,
    interest_rate: f64,
    minimum_payment: f64,
    linked_bill_id: Option<i64>,
    priority: Option<u32>,
    allocation_strategy: Option<String>,
    notes: Option<String>,
}

impl DebtCsvRow {
    fn into_debt(self) -> Debt {
        Debt {
            id: DebtId::Real(self.id),
            name: self.name,
            original_balance: self.original_balance.unwrap_or(self.current_balance),
            current_balance: self.current_balance,
            interest_rate: self.interest_rate,
            minimum_payment: self.minimum_payment,
            linked_bill_id: self.linked_bill_id,
            priority: self.priority,
            payment_allocation_strategy: self
                .allocation_strategy
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(AllocationStrategy::from_tag),
            notes: self.notes.filter(|n| !n.is_empty()),
            rate_buckets: Vec::new(),
        }
    }
}

/// Raw row of a rate buckets CSV, keyed to its owning debt by `debt_id`
#[derive(Debug, serde::Deserialize)]
struct BucketCsvRow {
    debt_id: i64,
    id: i64,
    name: String,
    balance: f64,
    interest_rate: f64,
    start_date: NaiveDate,
    expires_date: Option<NaiveDate>,
    is_retroactive: Option<bool>,
    retroactive_rate: Option<f64>,
    category: Option<String>,
}

impl BucketCsvRow {
    fn into_bucket(self) -> (i64, RateBucket) {
        let bucket = RateBucket {
            id: self.id,
            name: self.name,
            balance: self.balance,
            interest_rate: self.interest_rate,
            start_date: self.start_date,
            expires_date: self.expires_date,
            is_retroactive: self.is_retroactive.unwrap_or(false),
            retroactive_rate: self.retroactive_rate,
            category: self
                .category
                .as_deref()
                .map(BucketCategory::from_tag)
                .unwrap_or_default(),
        };
        (self.debt_id, bucket)
    }
}

/// Load flat debts from any reader
pub fn load_debts_from_reader<R: Read>(reader: R) -> Result<Vec<Debt>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut debts = Vec::new();

    for result in csv_reader.deserialize() {
        let row: DebtCsvRow = result?;
        debts.push(row.into_debt());
    }

    Ok(debts)
}

/// Attach rate buckets read from `reader` to their owning debts
pub fn attach_buckets_from_reader<R: Read>(debts: &mut [Debt], reader: R) -> Result<(), Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);

    for result in csv_reader.deserialize() {
        let row: BucketCsvRow = result?;
        let (debt_id, bucket) = row.into_bucket();

        let owner = debts
            .iter_mut()
            .find(|d| d.id == DebtId::Real(debt_id))
            .ok_or_else(|| format!("Rate bucket {} references unknown debt {}", bucket.id, debt_id))?;
        owner.rate_buckets.push(bucket);
    }

    Ok(())
}

/// Load debts from a CSV file, with an optional rate buckets CSV
pub fn load_debts<P: AsRef<Path>>(debts_path: P, buckets_path: Option<P>) -> Result<Vec<Debt>, Box<dyn Error>> {
    let mut debts = load_debts_from_reader(File::open(debts_path)?)?;

    if let Some(path) = buckets_path {
        attach_buckets_from_reader(&mut debts, File::open(path)?)?;
    }

    log::debug!("Loaded {} debts", debts.len());
    Ok(debts)
}

/// Load a full calculation request from a JSON file
pub fn load_request<P: AsRef<Path>>(path: P) -> Result<PayoffCalculationInput, Box<dyn Error>> {
    let reader = BufReader::new(File::open(path)?);
    let input: PayoffCalculationInput = serde_json::from_reader(reader)?;
    Ok(input)
}
