//! Waste unit API handlers.

use super::{created, deleted, parse_id};
use crate::{
    models::{ListQuery, WasteUnitInput, WasteUnitPatch},
    state::AppState,
    Result,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub async fn list_waste_units(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let collection = state.waste_unit_service.list(&query).await?;
    Ok((StatusCode::OK, Json(collection)).into_response())
}

pub async fn get_waste_unit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let unit = state
        .waste_unit_service
        .get(parse_id("Waste unit", &id)?)
        .await?;
    Ok((StatusCode::OK, Json(unit)).into_response())
}

pub async fn create_waste_unit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WasteUnitInput>, JsonRejection>,
) -> Result<Response> {
    let Json(input) = payload?;
    let unit = state.waste_unit_service.create(input).await?;
    Ok(created(format!("/api/v1/waste-units/{}", unit.unit_id), &unit))
}

pub async fn update_waste_unit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<WasteUnitPatch>, JsonRejection>,
) -> Result<Response> {
    let unit_id = parse_id("Waste unit", &id)?;
    let Json(patch) = payload?;
    let unit = state.waste_unit_service.update(unit_id, patch).await?;
    Ok((StatusCode::OK, Json(unit)).into_response())
}

pub async fn delete_waste_unit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    state
        .waste_unit_service
        .delete(parse_id("Waste unit", &id)?)
        .await?;
    Ok(deleted())
}
