//! Balance and per-day totals computed from the ledger.

use rusqlite::Connection;
use time::{Date, Duration, UtcOffset};

use crate::{
    Amount, Error,
    transaction::{TransactionType, sum_by_type},
    user::UserID,
};

/// A user's current balance: all income minus all expenses, over the whole
/// ledger.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn compute_balance(user_id: UserID, connection: &Connection) -> Result<Amount, Error> {
    let income = sum_by_type(user_id, TransactionType::Income, None, None, connection)?;
    let expenses = sum_by_type(user_id, TransactionType::Expense, None, None, connection)?;

    Ok(income - expenses)
}

/// Income and expense totals for a single local calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTotals {
    /// Total income for the day.
    pub income: Amount,
    /// Total expenses for the day.
    pub expenses: Amount,
}

/// The totals for the local calendar day `date`.
///
/// The day runs from local midnight to the next local midnight, as a
/// half-open range.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn daily_totals(
    user_id: UserID,
    date: Date,
    local_offset: UtcOffset,
    connection: &Connection,
) -> Result<DailyTotals, Error> {
    let day_start = date.midnight().assume_offset(local_offset);
    let day_end = day_start + Duration::days(1);

    let income = sum_by_type(
        user_id,
        TransactionType::Income,
        Some(day_start),
        Some(day_end),
        connection,
    )?;
    let expenses = sum_by_type(
        user_id,
        TransactionType::Expense,
        Some(day_start),
        Some(day_end),
        connection,
    )?;

    Ok(DailyTotals { income, expenses })
}
