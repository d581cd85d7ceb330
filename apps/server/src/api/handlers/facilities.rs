//! Facility API handlers.

use super::{created, deleted, parse_id};
use crate::{
    models::{FacilityInput, FacilityPatch, ListQuery},
    state::AppState,
    Result,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub async fn list_facilities(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let collection = state.facility_service.list(&query).await?;
    Ok((StatusCode::OK, Json(collection)).into_response())
}

/// `GET /facilities/{segment}`: numeric segments select by id, anything
/// else searches names.
pub async fn get_facility(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Response> {
    let collection = state.facility_service.lookup(&segment).await?;
    Ok((StatusCode::OK, Json(collection)).into_response())
}

pub async fn create_facility(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FacilityInput>, JsonRejection>,
) -> Result<Response> {
    let Json(input) = payload?;
    let facility = state.facility_service.create(input).await?;
    Ok(created(
        format!("/api/v1/facilities/{}", facility.facility_id),
        &facility,
    ))
}

pub async fn update_facility(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    payload: std::result::Result<Json<FacilityPatch>, JsonRejection>,
) -> Result<Response> {
    let facility_id = parse_id("Facility", &segment)?;
    let Json(patch) = payload?;
    let facility = state.facility_service.update(facility_id, patch).await?;
    Ok((StatusCode::OK, Json(facility)).into_response())
}

pub async fn delete_facility(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Response> {
    let facility_id = parse_id("Facility", &segment)?;
    state.facility_service.delete(facility_id).await?;
    Ok(deleted())
}

pub async fn list_facility_storage_tanks(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Response> {
    let facility_id = parse_id("Facility", &segment)?;
    let collection = state.facility_service.storage_tanks(facility_id).await?;
    Ok((StatusCode::OK, Json(collection)).into_response())
}

pub async fn list_facility_waste_units(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Response> {
    let facility_id = parse_id("Facility", &segment)?;
    let collection = state.facility_service.waste_units(facility_id).await?;
    Ok((StatusCode::OK, Json(collection)).into_response())
}

pub async fn list_facility_sample_ids(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Response> {
    let facility_id = parse_id("Facility", &segment)?;
    let collection = state.facility_service.sample_ids(facility_id).await?;
    Ok((StatusCode::OK, Json(collection)).into_response())
}
