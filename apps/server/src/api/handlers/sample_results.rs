//! Sample result API handlers.

use super::{created, deleted, parse_id};
use crate::{
    models::{SampleResultFilter, SampleResultInput, SampleResultPatch},
    state::AppState,
    Error, Result,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub async fn list_sample_results(
    State(state): State<AppState>,
    filter: std::result::Result<Query<SampleResultFilter>, QueryRejection>,
) -> Result<Response> {
    let Query(filter) = filter.map_err(|e| Error::Validation(e.body_text()))?;
    let results = state.sampling_service.list_results(&filter).await?;
    Ok((StatusCode::OK, Json(results)).into_response())
}

pub async fn get_sample_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let result = state
        .sampling_service
        .get_result(parse_id("Sample result", &id)?)
        .await?;
    Ok((StatusCode::OK, Json(result)).into_response())
}

pub async fn create_sample_result(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SampleResultInput>, JsonRejection>,
) -> Result<Response> {
    let Json(input) = payload?;
    let result = state.sampling_service.create_result(input).await?;
    Ok(created(
        format!("/api/v1/sample-results/{}", result.result_id),
        &result,
    ))
}

pub async fn update_sample_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<SampleResultPatch>, JsonRejection>,
) -> Result<Response> {
    let result_id = parse_id("Sample result", &id)?;
    let Json(patch) = payload?;
    let result = state
        .sampling_service
        .update_result(result_id, patch)
        .await?;
    Ok((StatusCode::OK, Json(result)).into_response())
}

pub async fn delete_sample_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    state
        .sampling_service
        .delete_result(parse_id("Sample result", &id)?)
        .await?;
    Ok(deleted())
}
