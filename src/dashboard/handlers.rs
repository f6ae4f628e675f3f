//! The dashboard page: summary cards, the most recent transaction and the
//! expense charts.
//!
//! The charts are drawn client side from the JSON endpoints in
//! [crate::dashboard::charts], so this handler only renders the page shell.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Amount, AppState, Error,
    dashboard::{
        summary::{DailyTotals, compute_balance, daily_totals},
        window::{BreakdownRange, TrendPeriod},
    },
    endpoints,
    html::{HeadElement, base, format_currency, link},
    navigation::NavBar,
    timezone::local_offset,
    transaction::{Transaction, get_last_transaction},
    user::UserID,
};

/// The pinned Chart.js build used to draw the dashboard charts.
const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.5.0/dist/chart.umd.min.js";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for querying transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's finances.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)
        .inspect_err(|error| tracing::error!("could not resolve local timezone: {error}"))?;
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let (balance, today_totals, last_transaction) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let balance = compute_balance(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not compute balance: {error}"))?;
        let today_totals = daily_totals(user_id, today, local_offset, &connection)
            .inspect_err(|error| tracing::error!("could not compute daily totals: {error}"))?;
        let last_transaction = get_last_transaction(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get last transaction: {error}"))?;

        (balance, today_totals, last_transaction)
    };

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    let page = match last_transaction {
        Some(last_transaction) => dashboard_view(
            nav_bar,
            balance,
            today_totals,
            &last_transaction,
            local_offset,
        ),
        None => dashboard_no_data_view(nav_bar),
    };

    Ok(page.into_response())
}

/// Renders the dashboard page when the user has no transactions yet.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "recording a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your balance and spending charts will show up here once you
                add some income or expenses. Start by " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with summary cards and chart containers.
fn dashboard_view(
    nav_bar: NavBar,
    balance: Amount,
    today_totals: DailyTotals,
    last_transaction: &Transaction,
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = nav_bar.into_html();
    let last_transaction_date = last_transaction.ts.to_offset(local_offset).date();

    let range_options: Vec<(&str, &str, bool)> = BreakdownRange::ALL
        .into_iter()
        .map(|range| {
            (
                range.as_query_value(),
                range.label(),
                range == BreakdownRange::default_preset(),
            )
        })
        .collect();
    let period_options: Vec<(&str, &str, bool)> = TrendPeriod::ALL
        .into_iter()
        .map(|period| {
            (
                period.as_query_value(),
                period.label(),
                period == TrendPeriod::default_preset(),
            )
        })
        .collect();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            section
                id="summary-cards"
                class="w-full mx-auto mt-4 mb-4"
            {
                div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
                {
                    (summary_card("Balance", format_currency(balance)))
                    (summary_card("Income today", format_currency(today_totals.income)))
                    (summary_card("Spent today", format_currency(today_totals.expenses)))
                }
            }

            p class="w-full text-sm text-gray-600 dark:text-gray-400 mb-4"
            {
                "Last transaction: "
                (last_transaction.category)
                " "
                (format_currency(last_transaction.amount))
                " ("
                (last_transaction.transaction_type.as_str())
                ") on "
                (last_transaction_date.to_string())
            }

            section
                id="charts"
                class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    (chart_panel(
                        "Spending by category",
                        "pie-range",
                        "pie-chart",
                        &range_options,
                    ))
                    (chart_panel(
                        "Daily spending",
                        "trend-period",
                        "trend-chart",
                        &period_options,
                    ))
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(CHART_JS_URL.to_owned()),
        charts_script(),
    ];

    base("Dashboard", &scripts, &content)
}

/// A card showing a single headline dollar figure.
fn summary_card(title: &str, value: String) -> Markup {
    html! {
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            h4 class="text-sm font-medium text-gray-600 dark:text-gray-400 mb-1" { (title) }
            div class="text-3xl font-bold" { (value) }
        }
    }
}

/// A chart container with a heading and a preset selector.
fn chart_panel(
    title: &str,
    select_id: &str,
    canvas_id: &str,
    options: &[(&str, &str, bool)],
) -> Markup {
    html! {
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { (title) }

                select
                    id=(select_id)
                    class="rounded border border-gray-300 dark:border-gray-600
                        bg-gray-50 dark:bg-gray-700 text-sm p-1.5"
                {
                    @for (value, label, is_default) in options {
                        option value=(value) selected[*is_default] { (label) }
                    }
                }
            }

            canvas id=(canvas_id) {}
        }
    }
}

/// Generates the JavaScript that fetches chart data and draws both charts.
///
/// Each chart is redrawn when its preset selector changes.
fn charts_script() -> HeadElement {
    let script_content = format!(
        r#"let pieChart = null;
        let trendChart = null;

        async function drawPieChart() {{
            const range = document.getElementById("pie-range").value;
            const response = await fetch("{pie_endpoint}?range=" + range);
            const chartData = await response.json();

            if (pieChart) {{
                pieChart.destroy();
            }}

            pieChart = new Chart(document.getElementById("pie-chart"), {{
                type: "pie",
                data: {{
                    labels: chartData.labels,
                    datasets: [{{ data: chartData.data }}],
                }},
            }});
        }}

        async function drawTrendChart() {{
            const period = document.getElementById("trend-period").value;
            const response = await fetch("{trends_endpoint}?period=" + period);
            const chartData = await response.json();

            if (trendChart) {{
                trendChart.destroy();
            }}

            trendChart = new Chart(document.getElementById("trend-chart"), {{
                type: "line",
                data: {{
                    labels: chartData.labels,
                    datasets: [{{
                        label: "Spent",
                        data: chartData.data,
                        fill: true,
                        tension: 0.3,
                    }}],
                }},
                options: {{ plugins: {{ legend: {{ display: false }} }} }},
            }});
        }}

        document.getElementById("pie-range").addEventListener("change", drawPieChart);
        document.getElementById("trend-period").addEventListener("change", drawTrendChart);

        drawPieChart();
        drawTrendChart();"#,
        pie_endpoint = endpoints::PIE_CHART_API,
        trends_endpoint = endpoints::TRENDS_API
    );

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}
