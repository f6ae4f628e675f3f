//! Dashboard module
//!
//! Provides an overview page showing the user's balance, today's totals and
//! expense charts, plus the JSON endpoints the charts are drawn from.

mod aggregation;
mod charts;
mod handlers;
mod summary;
mod window;

pub use charts::{get_expense_breakdown_data, get_expense_trend_data};
pub use handlers::get_dashboard_page;
