//! The application's route URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for recording a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The route the new transaction form posts to.
pub const TRANSACTIONS: &str = "/transactions";
/// The page for creating an account and the route its form posts to.
pub const SIGN_UP_VIEW: &str = "/auth/signup";
/// The page for logging in and the route its form posts to.
pub const LOG_IN_VIEW: &str = "/auth/login";
/// The route for logging out the current user.
pub const LOG_OUT: &str = "/auth/logout";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// The route serving expense totals grouped by category for the pie chart.
pub const PIE_CHART_API: &str = "/api/pie";
/// The route serving daily expense totals for the trend chart.
pub const TRENDS_API: &str = "/api/trends";
