//! Effective rates, bucket ordering and payment allocation across rate buckets

use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use crate::debt::AllocationStrategy;
use crate::payoff::{merge_bucket_payments, MonthlyBucketPayment};
use super::working::{total_balance, WorkingBucket};

/// Amounts at or below one cent are treated as zero
pub const PAYMENT_EPSILON: f64 = 0.01;

/// Monthly interest on `balance` at an annual percentage rate
pub fn monthly_interest(balance: f64, annual_rate: f64) -> f64 {
    balance * (annual_rate / 100.0 / 12.0)
}

/// Snap a balance under one cent to zero
pub fn settle(balance: f64) -> f64 {
    if balance < PAYMENT_EPSILON {
        0.0
    } else {
        balance
    }
}

/// Rate in force for a bucket on a given date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveRate {
    pub rate: f64,
    pub expired: bool,
    /// Deferred interest owed if the promo ended with a balance outstanding
    pub retroactive_interest: f64,
}

/// Whole calendar months from `start` to `end`, ignoring the day of month
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let years = end.year() - start.year();
    let months = end.month() as i32 - start.month() as i32;
    years * 12 + months
}

/// Resolve the rate a bucket accrues at on `current_date`
///
/// Without an expiration date, or before it, the bucket's own rate applies.
/// After expiry a retroactive bucket with a balance reports its retroactive
/// rate (the regular rate if unset) along with the deferred interest on its
/// initial balance since the start date; other buckets fall back to the
/// regular rate.
pub fn get_effective_rate(bucket: &WorkingBucket, current_date: NaiveDate, regular_rate: f64) -> EffectiveRate {
    let still_promotional = match bucket.expires_date {
        None => true,
        Some(expires) => current_date < expires,
    };

    if still_promotional {
        return EffectiveRate {
            rate: bucket.interest_rate,
            expired: false,
            retroactive_interest: 0.0,
        };
    }

    if bucket.is_retroactive && bucket.balance > 0.0 {
        let retro_rate = bucket.retroactive_rate.unwrap_or(regular_rate);
        let months = months_between(bucket.start_date, current_date);
        let retroactive_interest = monthly_interest(bucket.initial_balance, retro_rate) * months as f64;

        return EffectiveRate {
            rate: retro_rate,
            expired: true,
            retroactive_interest,
        };
    }

    EffectiveRate {
        rate: regular_rate,
        expired: true,
        retroactive_interest: 0.0,
    }
}

fn compare_buckets(a: &WorkingBucket, b: &WorkingBucket, strategy: AllocationStrategy) -> Ordering {
    match strategy {
        AllocationStrategy::LowestRateFirst => a.current_rate.total_cmp(&b.current_rate),
        AllocationStrategy::HighestRateFirst => b.current_rate.total_cmp(&a.current_rate),
        AllocationStrategy::OldestFirst => a.start_date.cmp(&b.start_date),
        AllocationStrategy::Unordered => Ordering::Equal,
    }
}

/// Order buckets for payment by the rate currently in force (or start date)
///
/// Stable: ties, and every bucket under `Unordered`, keep their input order.
pub fn sort_buckets(buckets: &[WorkingBucket], strategy: AllocationStrategy) -> Vec<&WorkingBucket> {
    let mut sorted: Vec<&WorkingBucket> = buckets.iter().collect();
    sorted.sort_by(|a, b| compare_buckets(a, b, strategy));
    sorted
}

/// Indices of buckets with a balance, in payment order
fn payment_order(buckets: &[WorkingBucket], strategy: AllocationStrategy) -> Vec<usize> {
    let mut order: Vec<usize> = (0..buckets.len()).filter(|&i| buckets[i].balance > 0.0).collect();
    order.sort_by(|&a, &b| compare_buckets(&buckets[a], &buckets[b], strategy));
    order
}

/// Interest accrued across a debt's buckets for one month
#[derive(Debug, Clone, PartialEq)]
pub struct InterestAccrual {
    /// One entry per bucket carrying a balance, no payment yet
    pub breakdown: Vec<MonthlyBucketPayment>,
    /// Regular interest plus any retroactive charge
    pub total_interest: f64,
}

/// Refresh each bucket's rate for `current_date` and capitalize the month's interest
///
/// A retroactive charge is added only in the month the promo flips from
/// active to expired.
pub fn accrue_interest(buckets: &mut [WorkingBucket], regular_rate: f64, current_date: NaiveDate) -> InterestAccrual {
    let mut breakdown = Vec::new();
    let mut total_interest = 0.0;

    for bucket in buckets.iter_mut().filter(|b| b.balance > 0.0) {
        let rate_info = get_effective_rate(bucket, current_date, regular_rate);
        bucket.current_rate = rate_info.rate;

        let was_expired = bucket.has_expired;
        bucket.has_expired = rate_info.expired;
        let newly_expired = !was_expired && bucket.has_expired;

        let interest = monthly_interest(bucket.balance, bucket.current_rate);
        let retroactive_interest = if newly_expired && rate_info.retroactive_interest > 0.0 {
            rate_info.retroactive_interest
        } else {
            0.0
        };

        bucket.balance += interest + retroactive_interest;
        total_interest += interest + retroactive_interest;

        breakdown.push(MonthlyBucketPayment {
            bucket_id: bucket.id,
            bucket_name: bucket.name.clone(),
            payment: 0.0,
            principal: 0.0,
            interest,
            remaining_balance: bucket.balance,
            interest_rate: bucket.current_rate,
            promo_expired: newly_expired,
            retroactive_interest,
        });
    }

    InterestAccrual { breakdown, total_interest }
}

/// Payment spread across buckets, without any interest accrual
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    /// One entry per bucket that received money
    pub payments: Vec<MonthlyBucketPayment>,
    /// Total actually applied; less than requested once buckets run out
    pub applied: f64,
}

/// Walk buckets in strategy order, paying each down until the amount is spent
///
/// Whatever is left once every bucket is cleared is not applied; the caller
/// decides where it goes.
pub fn distribute_payment(buckets: &mut [WorkingBucket], amount: f64, strategy: AllocationStrategy) -> Distribution {
    let mut remaining = amount;
    let mut payments = Vec::new();

    for index in payment_order(buckets, strategy) {
        if remaining <= PAYMENT_EPSILON {
            break;
        }

        let bucket = &mut buckets[index];
        let payment = remaining.min(bucket.balance);
        bucket.balance = settle((bucket.balance - payment).max(0.0));
        remaining -= payment;

        payments.push(MonthlyBucketPayment {
            bucket_id: bucket.id,
            bucket_name: bucket.name.clone(),
            payment,
            principal: payment,
            interest: 0.0,
            remaining_balance: bucket.balance,
            interest_rate: bucket.current_rate,
            promo_expired: false,
            retroactive_interest: 0.0,
        });
    }

    Distribution {
        payments,
        applied: amount - remaining,
    }
}

/// Result of a full monthly allocation against a debt's buckets
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub breakdown: Vec<MonthlyBucketPayment>,
    pub total_interest: f64,
    pub applied: f64,
    /// Sum of bucket balances afterwards
    pub remaining_balance: f64,
}

/// Accrue this month's interest on every bucket, then distribute `amount`
pub fn allocate_payment(
    buckets: &mut [WorkingBucket],
    amount: f64,
    strategy: AllocationStrategy,
    regular_rate: f64,
    current_date: NaiveDate,
) -> Allocation {
    let accrual = accrue_interest(buckets, regular_rate, current_date);
    let distribution = distribute_payment(buckets, amount, strategy);

    Allocation {
        breakdown: merge_bucket_payments(&accrual.breakdown, &distribution.payments),
        total_interest: accrual.total_interest,
        applied: distribution.applied,
        remaining_balance: total_balance(buckets),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::RateBucket;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn working(id: i64, balance: f64, rate: f64, start: NaiveDate) -> WorkingBucket {
        WorkingBucket::from_bucket(&RateBucket::new(id, format!("Bucket {}", id), balance, rate, start))
    }

    #[test]
    fn test_months_between_ignores_days() {
        assert_eq!(months_between(date(2025, 1, 31), date(2025, 2, 1)), 1);
        assert_eq!(months_between(date(2024, 11, 1), date(2025, 2, 28)), 3);
        assert_eq!(months_between(date(2025, 3, 15), date(2025, 3, 31)), 0);
    }

    #[test]
    fn test_effective_rate_without_expiration() {
        let bucket = working(1, 1000.0, 9.99, date(2025, 1, 1));
        let info = get_effective_rate(&bucket, date(2040, 1, 1), 24.0);

        assert_eq!(info, EffectiveRate { rate: 9.99, expired: false, retroactive_interest: 0.0 });
    }

    #[test]
    fn test_effective_rate_promo_then_regular() {
        let mut bucket = working(1, 1000.0, 0.0, date(2025, 1, 1));
        bucket.expires_date = Some(date(2025, 7, 1));

        let before = get_effective_rate(&bucket, date(2025, 6, 1), 24.0);
        assert_eq!(before.rate, 0.0);
        assert!(!before.expired);

        let after = get_effective_rate(&bucket, date(2025, 7, 1), 24.0);
        assert_eq!(after, EffectiveRate { rate: 24.0, expired: true, retroactive_interest: 0.0 });
    }

    #[test]
    fn test_effective_rate_retroactive() {
        let mut bucket = working(1, 1000.0, 0.0, date(2025, 1, 1));
        bucket.expires_date = Some(date(2025, 7, 1));
        bucket.is_retroactive = true;
        bucket.retroactive_rate = Some(25.0);

        let info = get_effective_rate(&bucket, date(2025, 7, 1), 18.0);
        assert_eq!(info.rate, 25.0);
        assert!(info.expired);
        assert_abs_diff_eq!(info.retroactive_interest, 125.0, epsilon = 1e-9);

        // Falls back to the regular rate when no retroactive rate is set
        bucket.retroactive_rate = None;
        let info = get_effective_rate(&bucket, date(2025, 7, 1), 18.0);
        assert_eq!(info.rate, 18.0);
        assert_abs_diff_eq!(info.retroactive_interest, 90.0, epsilon = 1e-9);

        // Paid-off buckets owe nothing
        bucket.balance = 0.0;
        let info = get_effective_rate(&bucket, date(2025, 7, 1), 18.0);
        assert_eq!(info.retroactive_interest, 0.0);
    }

    #[test]
    fn test_sort_buckets() {
        let buckets = vec![
            working(1, 100.0, 12.0, date(2025, 3, 1)),
            working(2, 100.0, 29.0, date(2024, 1, 1)),
            working(3, 100.0, 0.0, date(2024, 6, 1)),
        ];

        let ids = |sorted: Vec<&WorkingBucket>| sorted.iter().map(|b| b.id.unwrap()).collect::<Vec<_>>();

        assert_eq!(ids(sort_buckets(&buckets, AllocationStrategy::HighestRateFirst)), vec![2, 1, 3]);
        assert_eq!(ids(sort_buckets(&buckets, AllocationStrategy::LowestRateFirst)), vec![3, 1, 2]);
        assert_eq!(ids(sort_buckets(&buckets, AllocationStrategy::OldestFirst)), vec![2, 3, 1]);
        assert_eq!(ids(sort_buckets(&buckets, AllocationStrategy::Unordered)), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_uses_current_rate() {
        let mut buckets = vec![
            working(1, 100.0, 0.0, date(2025, 1, 1)),
            working(2, 100.0, 15.0, date(2025, 1, 1)),
        ];
        // Promo on bucket 1 has ended and it now accrues at 26%
        buckets[0].current_rate = 26.0;

        let sorted = sort_buckets(&buckets, AllocationStrategy::HighestRateFirst);
        assert_eq!(sorted[0].id, Some(1));
    }

    #[test]
    fn test_allocate_highest_rate_first() {
        let mut buckets = vec![
            working(1, 600.0, 0.0, date(2025, 1, 1)),
            working(2, 400.0, 24.0, date(2025, 1, 1)),
        ];

        let result = allocate_payment(&mut buckets, 500.0, AllocationStrategy::HighestRateFirst, 24.0, date(2025, 2, 1));

        // 400 * 2% = 8 interest capitalized on bucket 2, then 408 paid off there, 92 on bucket 1
        assert_abs_diff_eq!(result.total_interest, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.applied, 500.0, epsilon = 1e-9);
        assert_eq!(buckets[1].balance, 0.0);
        assert_abs_diff_eq!(buckets[0].balance, 508.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.remaining_balance, 508.0, epsilon = 1e-9);

        assert_eq!(result.breakdown.len(), 2);
        assert_abs_diff_eq!(result.breakdown[0].principal, 92.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.breakdown[1].payment, 408.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.breakdown[1].interest, 8.0, epsilon = 1e-9);
        assert_eq!(result.breakdown[1].remaining_balance, 0.0);
    }

    #[test]
    fn test_allocation_never_exceeds_balances() {
        let mut buckets = vec![working(1, 50.0, 0.0, date(2025, 1, 1))];

        let result = allocate_payment(&mut buckets, 500.0, AllocationStrategy::HighestRateFirst, 20.0, date(2025, 2, 1));

        assert_eq!(result.applied, 50.0);
        assert_eq!(buckets[0].balance, 0.0);
        assert_eq!(result.remaining_balance, 0.0);
    }

    #[test]
    fn test_retroactive_charge_fires_once() {
        let mut bucket = working(1, 1000.0, 0.0, date(2025, 2, 1));
        bucket.expires_date = Some(date(2025, 7, 15));
        bucket.is_retroactive = true;
        bucket.retroactive_rate = Some(25.0);
        let mut buckets = vec![bucket];

        let july = allocate_payment(&mut buckets, 10.0, AllocationStrategy::HighestRateFirst, 20.0, date(2025, 7, 1));
        assert_eq!(july.total_interest, 0.0);

        let august = allocate_payment(&mut buckets, 10.0, AllocationStrategy::HighestRateFirst, 20.0, date(2025, 8, 1));
        // 6 months deferred at 25% plus one month at 25% on the 990 balance
        assert_abs_diff_eq!(august.breakdown[0].retroactive_interest, 125.0, epsilon = 1e-9);
        assert!(august.breakdown[0].promo_expired);
        assert_abs_diff_eq!(august.total_interest, 125.0 + 990.0 * 25.0 / 1200.0, epsilon = 1e-9);

        let september = allocate_payment(&mut buckets, 10.0, AllocationStrategy::HighestRateFirst, 20.0, date(2025, 9, 1));
        assert_eq!(september.breakdown[0].retroactive_interest, 0.0);
        assert!(!september.breakdown[0].promo_expired);
    }

    #[test]
    fn test_distribute_skips_empty_buckets() {
        let mut buckets = vec![
            working(1, 0.0, 30.0, date(2025, 1, 1)),
            working(2, 100.0, 10.0, date(2025, 1, 1)),
        ];

        let distribution = distribute_payment(&mut buckets, 40.0, AllocationStrategy::HighestRateFirst);
        assert_eq!(distribution.payments.len(), 1);
        assert_eq!(distribution.payments[0].bucket_id, Some(2));
        assert_eq!(buckets[1].balance, 60.0);
    }
}
