#![allow(unused)]
//! API requests rejected before any query runs.

#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use support::*;

async fn expect_error(
    app: &TestApp,
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
    status: StatusCode,
    kind: &str,
) -> anyhow::Result<serde_json::Value> {
    let (actual, _headers, bytes) = app.request(method, path, body).await?;
    assert_status(actual, status, path);
    let json = json_body(&bytes)?;
    assert_eq!(json["error"], kind, "body: {json}");
    Ok(json)
}

#[tokio::test]
async fn facility_payloads_are_validated() -> anyhow::Result<()> {
    let app = offline_app()?;
    let unprocessable = StatusCode::UNPROCESSABLE_ENTITY;

    expect_error(&app, Method::POST, "/api/v1/facilities/", Some(json!({ "name": "  " })), unprocessable, "validation").await?;
    expect_error(
        &app,
        Method::POST,
        "/api/v1/facilities/",
        Some(json!({ "name": "Acme", "longitude": -84.2, "latitude": 95.0 })),
        unprocessable,
        "validation",
    )
    .await?;
    expect_error(
        &app,
        Method::POST,
        "/api/v1/facilities",
        Some(json!({ "name": "Acme", "state": "OHIO" })),
        unprocessable,
        "validation",
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn missing_json_content_type_is_a_validation_error() -> anyhow::Result<()> {
    let app = offline_app()?;
    let json = expect_error(
        &app,
        Method::POST,
        "/api/v1/facilities/",
        None,
        StatusCode::UNPROCESSABLE_ENTITY,
        "validation",
    )
    .await?;
    assert!(json["message"].as_str().unwrap_or("").contains("Content-Type"));
    Ok(())
}

#[tokio::test]
async fn waste_unit_geometry_must_be_polygonal() -> anyhow::Result<()> {
    let app = offline_app()?;
    expect_error(
        &app,
        Method::POST,
        "/api/v1/waste-units/",
        Some(json!({
            "facility_id": 1,
            "name": "Cell 1",
            "unit_type": "landfill",
            "geometry": { "type": "Point", "coordinates": [-84.2, 39.7] }
        })),
        StatusCode::UNPROCESSABLE_ENTITY,
        "validation",
    )
    .await?;

    // Malformed polygons never reach PostGIS.
    for coordinates in [
        json!([[]]),
        json!([[[-84.2, 39.7], [-84.1, 39.7], [-84.2, 39.7]]]),
        json!([[[-84.2, 39.7], [-84.1, 39.7], [-84.1, 39.8], [-84.2, 39.8]]]),
    ] {
        expect_error(
            &app,
            Method::POST,
            "/api/v1/waste-units/",
            Some(json!({
                "facility_id": 1,
                "name": "Cell 2",
                "unit_type": "impoundment",
                "geometry": { "type": "Polygon", "coordinates": coordinates }
            })),
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation",
        )
        .await?;
    }
    Ok(())
}

#[tokio::test]
async fn plain_sample_ids_cannot_carry_construction() -> anyhow::Result<()> {
    let app = offline_app()?;
    expect_error(
        &app,
        Method::POST,
        "/api/v1/sample-ids/",
        Some(json!({
            "facility_id": 1,
            "name": "SW-1",
            "sample_id_type": "sample_id",
            "construction": { "top_screen": 10.0 }
        })),
        StatusCode::UNPROCESSABLE_ENTITY,
        "validation",
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn sample_results_need_well_formed_codes() -> anyhow::Result<()> {
    let app = offline_app()?;
    expect_error(
        &app,
        Method::POST,
        "/api/v1/sample-results/",
        Some(json!({
            "sample_id": 1,
            "param_cd": "10",
            "sample_date": "2024-03-01T10:00:00Z"
        })),
        StatusCode::UNPROCESSABLE_ENTITY,
        "validation",
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn result_filters_are_checked() -> anyhow::Result<()> {
    let app = offline_app()?;
    expect_error(
        &app,
        Method::GET,
        "/api/v1/sample-results/?start=2024-02-01T00:00:00Z&end=2024-01-01T00:00:00Z",
        None,
        StatusCode::UNPROCESSABLE_ENTITY,
        "validation",
    )
    .await?;
    expect_error(
        &app,
        Method::GET,
        "/api/v1/sample-results/?limit=many",
        None,
        StatusCode::UNPROCESSABLE_ENTITY,
        "validation",
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn malformed_reference_codes_are_bad_requests() -> anyhow::Result<()> {
    let app = offline_app()?;
    expect_error(
        &app,
        Method::GET,
        "/api/v1/sample-parameters/12a45",
        None,
        StatusCode::BAD_REQUEST,
        "invalid_reference",
    )
    .await?;
    expect_error(
        &app,
        Method::GET,
        "/api/v1/medium-codes/WATER",
        None,
        StatusCode::BAD_REQUEST,
        "invalid_reference",
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn non_numeric_ids_are_not_found() -> anyhow::Result<()> {
    let app = offline_app()?;
    for (method, path) in [
        (Method::GET, "/api/v1/storage-tanks/tank-7"),
        (Method::DELETE, "/api/v1/waste-units/cell-1"),
        (Method::GET, "/api/v1/sample-ids/mw-1"),
        (Method::DELETE, "/api/v1/facilities/acme"),
        (Method::GET, "/api/v1/sample-results/+12"),
        (Method::DELETE, "/api/v1/storage-tanks/-4"),
    ] {
        expect_error(&app, method, path, None, StatusCode::NOT_FOUND, "not_found").await?;
    }
    Ok(())
}
