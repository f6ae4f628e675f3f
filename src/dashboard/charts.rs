//! JSON endpoints serving the data behind the dashboard charts.
//!
//! The dashboard page renders empty canvases and a small script that fetches
//! these endpoints, so chart data stays queryable without scraping HTML.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Amount, AppState, Error,
    dashboard::{
        aggregation::{daily_series, expense_totals_by_category},
        window::{BreakdownRange, TrendPeriod},
    },
    timezone::local_offset,
    transaction::get_expenses_since,
    user::UserID,
};

/// The state needed for serving chart data.
#[derive(Debug, Clone)]
pub struct ChartDataState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for querying transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ChartDataState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Labels and values for a single chart, in matching order.
#[derive(Debug, PartialEq, Serialize)]
pub struct ChartData {
    /// The label for each data point, e.g. a category name or a date.
    pub labels: Vec<String>,
    /// The dollar amount for each label.
    pub data: Vec<Amount>,
}

/// The query string for the expense breakdown endpoint.
#[derive(Debug, Deserialize)]
pub struct BreakdownQuery {
    /// The time range to sum expenses over, e.g. "week".
    pub range: Option<String>,
}

/// The query string for the expense trend endpoint.
#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    /// The period to chart daily expenses over, e.g. "month".
    pub period: Option<String>,
}

/// Expense totals per category over the requested range, largest first.
///
/// Unrecognised or missing `range` values fall back to the default range
/// rather than erroring, so a stale link still renders a chart.
///
/// # Errors
/// Returns an [Error] if the database cannot be queried or the configured
/// timezone is invalid.
pub async fn get_expense_breakdown_data(
    State(state): State<ChartDataState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<BreakdownQuery>,
) -> Result<Json<ChartData>, Error> {
    let range = BreakdownRange::from_query(query.range.as_deref());
    let local_offset = local_offset(&state.local_timezone)
        .inspect_err(|error| tracing::error!("could not resolve local timezone: {error}"))?;

    let now = OffsetDateTime::now_utc().to_offset(local_offset);
    let start = range.start(now);

    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_expenses_since(user_id, start, &connection)?
    };

    let (labels, data) = expense_totals_by_category(&expenses).into_iter().unzip();

    Ok(Json(ChartData { labels, data }))
}

/// Total expenses per day over the requested period, oldest day first.
///
/// Every day in the period gets an entry, so days without spending show up
/// as zero instead of being skipped. Unrecognised or missing `period` values
/// fall back to the default period.
///
/// # Errors
/// Returns an [Error] if the database cannot be queried or the configured
/// timezone is invalid.
pub async fn get_expense_trend_data(
    State(state): State<ChartDataState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<ChartData>, Error> {
    let period = TrendPeriod::from_query(query.period.as_deref());
    let local_offset = local_offset(&state.local_timezone)
        .inspect_err(|error| tracing::error!("could not resolve local timezone: {error}"))?;

    let end = OffsetDateTime::now_utc().to_offset(local_offset).date();
    let start_day = end - Duration::days(period.lookback_days());
    let start = start_day.midnight().assume_offset(local_offset);

    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_expenses_since(user_id, start, &connection)?
    };

    let (labels, data) = daily_series(&expenses, start_day, end, local_offset)
        .into_iter()
        .map(|(day, total)| (day.to_string(), total))
        .unzip();

    Ok(Json(ChartData { labels, data }))
}
