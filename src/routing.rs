//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    response::Redirect,
    routing::{get, post},
};

use crate::{
    AppState,
    auth::{
        AuthState, auth_guard, auth_guard_api, get_log_in_page, get_log_out, get_sign_up_page,
        post_log_in, post_sign_up,
    },
    dashboard::{get_dashboard_page, get_expense_breakdown_data, get_expense_trend_data},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    logging::logging_middleware,
    not_found::get_404_not_found,
    transaction::{create_transaction_endpoint, get_new_transaction_page},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    // Log-out stays outside the auth guard: the guard re-issues the session
    // cookies on the way out, which would undo the invalidation.
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(
            endpoints::SIGN_UP_VIEW,
            get(get_sign_up_page).post(post_sign_up),
        )
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).post(post_log_in),
        )
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let auth_state = AuthState::from_ref(&state);

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_guard,
        ));

    // The chart endpoints serve JSON, so an expired session gets a 401
    // instead of a redirect to the log-in page.
    let api_routes = Router::new()
        .route(endpoints::PIE_CHART_API, get(get_expense_breakdown_data))
        .route(endpoints::TRENDS_API, get(get_expense_trend_data))
        .layer(middleware::from_fn_with_state(auth_state, auth_guard_api));

    protected_routes
        .merge(api_routes)
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod router_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::OffsetDateTime;

    use crate::{AppState, auth::COOKIE_USER_ID, endpoints, routing::build_router};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().expect("Could not open database.");
        let state = AppState::new(connection, "wuthering-heights", "Etc/UTC")
            .expect("Could not create app state.");

        let mut server =
            TestServer::try_new(build_router(state)).expect("Could not create test server.");
        server.save_cookies();

        server
    }

    async fn sign_up(server: &TestServer) {
        let response = server
            .post(endpoints::SIGN_UP_VIEW)
            .form(&[
                ("name", "Ada Lovelace"),
                ("age", "30"),
                ("email", "ada@example.com"),
                ("password", "averysafepassword"),
                ("confirm_password", "averysafepassword"),
            ])
            .await;

        response.assert_status_see_other();
        assert!(
            response.maybe_cookie(COOKIE_USER_ID).is_some(),
            "want sign up to set the auth cookie"
        );
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn anonymous_user_is_redirected_to_log_in() {
        let server = get_test_server();

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            "/auth/login?redirect_url=%2Fdashboard"
        );
    }

    #[tokio::test]
    async fn anonymous_api_request_gets_unauthorized_json() {
        let server = get_test_server();

        let response = server.get(endpoints::PIE_CHART_API).await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body, json!({"error": "authentication required"}));
    }

    #[tokio::test]
    async fn unknown_route_returns_not_found() {
        let server = get_test_server();

        let response = server.get("/definitely-not-a-page").await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn recording_transactions_updates_dashboard_and_charts() {
        let server = get_test_server();
        sign_up(&server).await;

        let today = OffsetDateTime::now_utc().date().to_string();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .form(&[
                ("transaction_type", "income"),
                ("amount", "100.00"),
                ("date", &today),
                ("category", "Salary"),
                ("note", ""),
            ])
            .await;
        response.assert_status_see_other();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .form(&[
                ("transaction_type", "expense"),
                ("amount", "12.50"),
                ("date", &today),
                ("category", "Food"),
                ("note", "lunch"),
            ])
            .await;
        response.assert_status_see_other();

        let response = server.get(endpoints::DASHBOARD_VIEW).await;
        response.assert_status_ok();
        let page = response.text();
        assert!(
            page.contains("$87.50"),
            "want the balance $87.50 on the dashboard, got:\n{page}"
        );
        assert!(
            page.contains("$100.00"),
            "want today's income $100.00 on the dashboard, got:\n{page}"
        );

        let response = server
            .get(endpoints::PIE_CHART_API)
            .add_query_param("range", "month")
            .await;
        response.assert_status_ok();
        let chart: Value = response.json();
        assert_eq!(chart, json!({"labels": ["Food"], "data": [12.5]}));

        let response = server
            .get(endpoints::TRENDS_API)
            .add_query_param("period", "week")
            .await;
        response.assert_status_ok();
        let chart: Value = response.json();
        let total: f64 = chart["data"]
            .as_array()
            .expect("want a data array")
            .iter()
            .map(|value| value.as_f64().expect("want numbers in the data array"))
            .sum();
        assert_eq!(total, 12.5);
        assert_eq!(
            chart["labels"]
                .as_array()
                .expect("want a labels array")
                .last()
                .expect("want at least one label"),
            &json!(today)
        );
    }

    #[tokio::test]
    async fn log_out_ends_the_session() {
        let server = get_test_server();
        sign_up(&server).await;

        let response = server.get(endpoints::LOG_OUT).await;
        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN_VIEW);

        let response = server.get(endpoints::DASHBOARD_VIEW).await;
        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            "/auth/login?redirect_url=%2Fdashboard"
        );
    }
}
