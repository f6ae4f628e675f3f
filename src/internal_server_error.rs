//! Defines the view and route handlers for the page to display for an internal server error.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{endpoints, html::error_view};

/// The description and suggested fix shown on the internal server error page.
pub struct InternalServerError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl InternalServerError<'_> {
    pub fn into_html(self) -> Html<String> {
        Html(error_view("Internal Server Error", "500", self.description, self.fix).into_string())
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.into_html()).into_response()
    }
}

/// Display the internal server error page.
pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}

/// An HTMX redirect to the internal server error page.
///
/// For form endpoints where the problem is not something the user can fix by
/// editing their input, so re-rendering the form would be misleading.
pub fn get_internal_server_error_redirect() -> Response {
    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        (),
    )
        .into_response()
}

#[cfg(test)]
mod internal_server_error_tests {
    use axum::http::StatusCode;
    use axum_htmx::HX_REDIRECT;

    use crate::{
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{get_internal_server_error_page, get_internal_server_error_redirect};

    #[tokio::test]
    async fn renders_error_page() {
        let response = get_internal_server_error_page().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let header_selector = scraper::Selector::parse("h1").unwrap();
        let header = document
            .select(&header_selector)
            .next()
            .expect("want an h1 header");
        assert_eq!(header.text().collect::<String>().trim(), "500");
    }

    #[test]
    fn redirect_points_at_error_page() {
        let response = get_internal_server_error_redirect();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::INTERNAL_ERROR_VIEW
        );
    }
}
