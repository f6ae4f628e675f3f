#![allow(missing_docs)]

use axum::{body::Body, http::StatusCode, response::Response};
use scraper::Html;

async fn response_text(response: Response<Body>) -> String {
    let body = response.into_body();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");

    String::from_utf8_lossy(&bytes).to_string()
}

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let text = response_text(response).await;

    Html::parse_document(&text)
}

pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    let text = response_text(response).await;

    Html::parse_fragment(&text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_content_type_html(response: &Response<Body>) {
    let content_type = response
        .headers()
        .get("content-type")
        .expect("content-type header missing");

    assert_eq!(content_type, "text/html; charset=utf-8");
}
