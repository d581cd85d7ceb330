//! Sample ID API handlers.

use super::{created, deleted, parse_id};
use crate::{
    models::{ListQuery, SampleIdInput, SampleIdPatch},
    state::AppState,
    Result,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub async fn list_sample_ids(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let collection = state.sampling_service.list_sample_ids(&query).await?;
    Ok((StatusCode::OK, Json(collection)).into_response())
}

pub async fn get_sample_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let sample = state
        .sampling_service
        .get_sample_id(parse_id("Sample ID", &id)?)
        .await?;
    Ok((StatusCode::OK, Json(sample)).into_response())
}

pub async fn create_sample_id(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SampleIdInput>, JsonRejection>,
) -> Result<Response> {
    let Json(input) = payload?;
    let sample = state.sampling_service.create_sample_id(input).await?;
    Ok(created(
        format!("/api/v1/sample-ids/{}", sample.sample_id),
        &sample,
    ))
}

pub async fn update_sample_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<SampleIdPatch>, JsonRejection>,
) -> Result<Response> {
    let sample_id = parse_id("Sample ID", &id)?;
    let Json(patch) = payload?;
    let sample = state
        .sampling_service
        .update_sample_id(sample_id, patch)
        .await?;
    Ok((StatusCode::OK, Json(sample)).into_response())
}

pub async fn delete_sample_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    state
        .sampling_service
        .delete_sample_id(parse_id("Sample ID", &id)?)
        .await?;
    Ok(deleted())
}
