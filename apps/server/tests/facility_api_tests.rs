#![allow(unused)]
//! Facility hierarchy over the REST API. Requires a PostGIS test database.

#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use support::*;

async fn create_facility(app: &TestApp, name: &str) -> anyhow::Result<i64> {
    let (status, headers, body) = app
        .request(
            Method::POST,
            "/api/v1/facilities/",
            Some(json!({
                "name": name,
                "address": "100 Main St",
                "city": "Dayton",
                "state": "oh",
                "zipcode": "45402",
                "longitude": -84.19,
                "latitude": 39.76
            })),
        )
        .await?;
    assert_status(status, StatusCode::CREATED, "create facility");
    let facility = json_body(&body)?;
    let id = facility["facility_id"].as_i64().unwrap_or_default();
    assert_eq!(
        header_str(&headers, "location"),
        format!("/api/v1/facilities/{id}")
    );
    Ok(id)
}

#[tokio::test]
async fn facility_lifecycle() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let name = unique_name("Acme Plating");
            let id = create_facility(&app, &name).await?;

            let (status, _headers, body) = app
                .request(Method::GET, &format!("/api/v1/facilities/{id}"), None)
                .await?;
            assert_status(status, StatusCode::OK, "get facility");
            let collection = json_body(&body)?;
            assert_eq!(collection["type"], "FeatureCollection");
            let feature = &collection["features"][0];
            assert_eq!(feature["properties"]["name"], name.as_str());
            assert_eq!(feature["properties"]["state"], "OH");
            assert_eq!(feature["geometry"]["type"], "Point");

            // Partial update keeps absent fields and clears explicit nulls.
            let (status, _headers, body) = app
                .request(
                    Method::PUT,
                    &format!("/api/v1/facilities/{id}"),
                    Some(json!({ "city": "Xenia", "zipcode": null })),
                )
                .await?;
            assert_status(status, StatusCode::OK, "update facility");
            let updated = json_body(&body)?;
            assert_eq!(updated["name"], name.as_str());
            assert_eq!(updated["city"], "Xenia");
            assert_eq!(updated["zipcode"], Value::Null);
            assert_eq!(updated["address"], "100 Main St");

            let (status, _headers, body) = app
                .request(Method::DELETE, &format!("/api/v1/facilities/{id}"), None)
                .await?;
            assert_status(status, StatusCode::OK, "delete facility");
            assert_eq!(json_body(&body)?, json!({}));

            let (status, _headers, _body) = app
                .request(Method::GET, &format!("/api/v1/facilities/{id}"), None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "deleted facility");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn name_segment_searches_case_insensitively() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let name = unique_name("Riverside Landfill");
            create_facility(&app, &name).await?;

            let fragment = name.rsplit(' ').next().unwrap_or_default().to_uppercase();
            let (status, _headers, body) = app
                .request(Method::GET, &format!("/api/v1/facilities/{fragment}"), None)
                .await?;
            assert_status(status, StatusCode::OK, "search facility");
            let collection = json_body(&body)?;
            assert_eq!(collection["features"].as_array().map(Vec::len), Some(1));

            let (status, _headers, body) = app
                .request(Method::GET, "/api/v1/facilities/no-such-facility-anywhere", None)
                .await?;
            assert_status(status, StatusCode::OK, "empty search");
            assert_eq!(json_body(&body)?["features"], json!([]));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn duplicate_facility_names_conflict() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let name = unique_name("Twin Oaks");
            create_facility(&app, &name).await?;
            let (status, _headers, body) = app
                .request(Method::POST, "/api/v1/facilities/", Some(json!({ "name": name })))
                .await?;
            assert_status(status, StatusCode::CONFLICT, "duplicate name");
            assert_eq!(json_body(&body)?["error"], "conflict");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn tanks_and_units_hang_off_their_facility() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let facility_id = create_facility(&app, &unique_name("Tank Farm")).await?;

            let tank = json!({
                "facility_id": facility_id,
                "tank_registration_id": "0012345-01",
                "capacity": 10000,
                "stored_substance": "Diesel",
                "tank_type": "ust",
                "longitude": -84.2,
                "latitude": 39.7
            });
            let (status, _headers, body) = app
                .request(Method::POST, "/api/v1/storage-tanks/", Some(tank.clone()))
                .await?;
            assert_status(status, StatusCode::CREATED, "create tank");
            let created = json_body(&body)?;
            assert_eq!(created["status"], "active");
            let tank_id = created["tank_id"].as_i64().unwrap_or_default();

            let (status, _headers, _body) = app
                .request(Method::POST, "/api/v1/storage-tanks/", Some(tank))
                .await?;
            assert_status(status, StatusCode::CONFLICT, "duplicate registration");

            let (status, _headers, body) = app
                .request(
                    Method::PUT,
                    &format!("/api/v1/storage-tanks/{tank_id}"),
                    Some(json!({ "status": "closed", "date_removed": "2023-05-01" })),
                )
                .await?;
            assert_status(status, StatusCode::OK, "close tank");
            assert_eq!(json_body(&body)?["status"], "closed");

            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    "/api/v1/waste-units/",
                    Some(json!({
                        "facility_id": facility_id,
                        "name": "Cell 1",
                        "unit_type": "landfill",
                        "geometry": {
                            "type": "Polygon",
                            "coordinates": [[[-84.2, 39.7], [-84.1, 39.7], [-84.1, 39.8], [-84.2, 39.7]]]
                        }
                    })),
                )
                .await?;
            assert_status(status, StatusCode::CREATED, "create waste unit");
            assert_eq!(json_body(&body)?["geometry"]["type"], "MultiPolygon");

            let (status, _headers, body) = app
                .request(
                    Method::GET,
                    &format!("/api/v1/facilities/{facility_id}/storage-tanks"),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "facility tanks");
            let tanks = json_body(&body)?;
            assert_eq!(tanks["features"].as_array().map(Vec::len), Some(1));
            assert_eq!(tanks["features"][0]["properties"]["tank_type"], "ust");

            let (status, _headers, body) = app
                .request(
                    Method::GET,
                    &format!("/api/v1/facilities/{facility_id}/waste-units"),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "facility units");
            assert_eq!(json_body(&body)?["features"][0]["geometry"]["type"], "MultiPolygon");

            // Deleting the facility takes its children with it.
            app.request(Method::DELETE, &format!("/api/v1/facilities/{facility_id}"), None)
                .await?;
            let (status, _headers, _body) = app
                .request(Method::GET, &format!("/api/v1/storage-tanks/{tank_id}"), None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "cascaded tank");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn children_of_missing_facility() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    "/api/v1/storage-tanks/",
                    Some(json!({ "facility_id": i32::MAX, "tank_type": "ast" })),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "tank for missing facility");
            assert_eq!(json_body(&body)?["error"], "invalid_reference");

            let (status, _headers, _body) = app
                .request(
                    Method::GET,
                    &format!("/api/v1/facilities/{}/waste-units", i32::MAX),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "units of missing facility");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn facility_collection_is_not_truncated() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let per_page = envirobase::config::Config::defaults().app.posts_per_page as usize;
            let prefix = unique_name("Bulk Site");
            let mut ids = Vec::new();
            for n in 0..=per_page {
                ids.push(create_facility(&app, &format!("{prefix} {n}")).await?);
            }

            let (status, _headers, body) = app
                .request(Method::GET, "/api/v1/facilities/", None)
                .await?;
            assert_status(status, StatusCode::OK, "list facilities");
            let collection = json_body(&body)?;
            let listed: Vec<i64> = collection["features"]
                .as_array()
                .map(|features| {
                    features
                        .iter()
                        .filter_map(|f| f["properties"]["facility_id"].as_i64())
                        .collect()
                })
                .unwrap_or_default();
            assert!(listed.len() > per_page, "only {} features", listed.len());
            for id in &ids {
                assert!(listed.contains(id), "facility {id} missing from the collection");
            }

            // An explicit limit still pages.
            let (status, _headers, body) = app
                .request(Method::GET, "/api/v1/facilities/?limit=5&offset=1", None)
                .await?;
            assert_status(status, StatusCode::OK, "paged facilities");
            assert_eq!(
                json_body(&body)?["features"].as_array().map(Vec::len),
                Some(5)
            );
            Ok(())
        })
    })
    .await
}
