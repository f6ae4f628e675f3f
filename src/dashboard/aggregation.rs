//! Turning slices of the ledger into chart series.
//!
//! These functions are pure: the handlers fetch the relevant transactions
//! and the aggregation here only groups and sums them.

use std::collections::HashMap;

use time::{Date, Duration, UtcOffset};

use crate::{Amount, transaction::Transaction};

/// Sum transaction amounts per category, largest total first.
///
/// Categories with equal totals are ordered alphabetically so the output is
/// deterministic.
pub(super) fn expense_totals_by_category(transactions: &[Transaction]) -> Vec<(String, Amount)> {
    let mut totals: HashMap<&str, Amount> = HashMap::new();

    for transaction in transactions {
        *totals
            .entry(transaction.category.as_str())
            .or_insert(Amount::ZERO) += transaction.amount;
    }

    let mut totals: Vec<(String, Amount)> = totals
        .into_iter()
        .map(|(category, total)| (category.to_owned(), total))
        .collect();

    totals.sort_by(|(category_a, total_a), (category_b, total_b)| {
        total_b
            .as_cents()
            .cmp(&total_a.as_cents())
            .then_with(|| category_a.cmp(category_b))
    });

    totals
}

/// Bucket transaction amounts by local calendar day, one entry per day from
/// `start` through `end` inclusive.
///
/// Days without transactions get a zero total so chart axes stay dense.
pub(super) fn daily_series(
    transactions: &[Transaction],
    start: Date,
    end: Date,
    local_offset: UtcOffset,
) -> Vec<(Date, Amount)> {
    let mut totals: HashMap<Date, Amount> = HashMap::new();

    for transaction in transactions {
        let day = transaction.ts.to_offset(local_offset).date();
        *totals.entry(day).or_insert(Amount::ZERO) += transaction.amount;
    }

    let total_days = (end - start).whole_days();

    (0..=total_days)
        .map(|day_offset| {
            let day = start + Duration::days(day_offset);
            let total = totals.get(&day).copied().unwrap_or(Amount::ZERO);
            (day, total)
        })
        .collect()
}
