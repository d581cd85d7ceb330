//! Server-rendered HTML: embedded Tera templates and form handling.

pub mod forms;
pub mod templates;

pub use forms::{FacilityForm, FieldErrors, StorageTankForm, TokenForm, WasteUnitForm};
pub use templates::Templates;

use crate::{csrf::CsrfToken, Error};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

/// Error wrapper for page handlers: same status mapping as the API, but
/// rendered as a small HTML document instead of JSON.
#[derive(Debug)]
pub struct HtmlError(pub Error);

impl From<Error> for HtmlError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let detail = if status.is_server_error() {
            tracing::error!(error = %self.0, kind = self.0.kind(), "Page request failed");
            "Something went wrong on our side.".to_string()
        } else {
            self.0.to_string()
        };
        let reason = status.canonical_reason().unwrap_or("Error");
        let body = format!(
            "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{code} {reason}</title></head>\
             <body><h1>{code} {reason}</h1><p>{detail}</p><p><a href=\"/\">Back to facilities</a></p></body></html>",
            code = status.as_u16(),
            reason = reason,
            detail = tera::escape_html(&detail),
        );
        (status, Html(body)).into_response()
    }
}

pub type PageResult = std::result::Result<Response, HtmlError>;

/// Build an HTML response, attaching the CSRF cookie when one was minted.
pub fn html_response(status: StatusCode, body: String, csrf: Option<&CsrfToken>) -> Response {
    let mut response = (status, Html(body)).into_response();
    if let Some(cookie) = csrf.and_then(|c| c.set_cookie.clone()) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

/// `303 See Other` to `location`, used after successful form posts.
pub fn see_other(location: &str) -> Response {
    let mut response = StatusCode::SEE_OTHER.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}
