//! Storage tank API handlers.

use super::{created, deleted, parse_id};
use crate::{
    models::{ListQuery, StorageTankInput, StorageTankPatch},
    state::AppState,
    Result,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub async fn list_storage_tanks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let collection = state.storage_tank_service.list(&query).await?;
    Ok((StatusCode::OK, Json(collection)).into_response())
}

pub async fn get_storage_tank(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let tank = state
        .storage_tank_service
        .get(parse_id("Storage tank", &id)?)
        .await?;
    Ok((StatusCode::OK, Json(tank)).into_response())
}

pub async fn create_storage_tank(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StorageTankInput>, JsonRejection>,
) -> Result<Response> {
    let Json(input) = payload?;
    let tank = state.storage_tank_service.create(input).await?;
    Ok(created(format!("/api/v1/storage-tanks/{}", tank.tank_id), &tank))
}

pub async fn update_storage_tank(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<StorageTankPatch>, JsonRejection>,
) -> Result<Response> {
    let tank_id = parse_id("Storage tank", &id)?;
    let Json(patch) = payload?;
    let tank = state.storage_tank_service.update(tank_id, patch).await?;
    Ok((StatusCode::OK, Json(tank)).into_response())
}

pub async fn delete_storage_tank(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    state
        .storage_tank_service
        .delete(parse_id("Storage tank", &id)?)
        .await?;
    Ok(deleted())
}
