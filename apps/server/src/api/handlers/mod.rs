//! Request handlers. JSON handlers return `crate::Result<Response>`; page
//! handlers return `crate::views::PageResult`.

pub mod facilities;
pub mod health;
pub mod pages;
pub mod reference;
pub mod sample_ids;
pub mod sample_results;
pub mod storage_tanks;
pub mod waste_units;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{Error, Result};

/// Parse a numeric path segment. Only unsigned digits name a row, the same
/// rule `FacilityRef::parse` uses; anything else is a 404.
pub(crate) fn parse_id(entity: &str, segment: &str) -> Result<i32> {
    let digits = segment.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::not_found(entity, segment));
    }
    digits
        .parse()
        .map_err(|_| Error::not_found(entity, segment))
}

/// `201 Created` with a `Location` header and the record as JSON.
pub(crate) fn created<T: Serialize>(location: String, body: &T) -> Response {
    let mut response = (StatusCode::CREATED, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

/// Body returned by successful deletes.
pub(crate) fn deleted() -> Response {
    (StatusCode::OK, Json(serde_json::json!({}))).into_response()
}
