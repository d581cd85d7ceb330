//! Parameter and medium code lookups.

use crate::{models::reference::ParameterQuery, state::AppState, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub async fn list_parameters(
    State(state): State<AppState>,
    Query(query): Query<ParameterQuery>,
) -> Result<Response> {
    let parameters = state.reference_service.parameters(&query).await?;
    Ok((StatusCode::OK, Json(parameters)).into_response())
}

pub async fn get_parameter(
    State(state): State<AppState>,
    Path(param_cd): Path<String>,
) -> Result<Response> {
    let parameter = state.reference_service.parameter(&param_cd).await?;
    Ok((StatusCode::OK, Json(parameter)).into_response())
}

pub async fn list_medium_codes(State(state): State<AppState>) -> Result<Response> {
    let codes = state.reference_service.medium_codes().await?;
    Ok((StatusCode::OK, Json(codes)).into_response())
}

pub async fn get_medium_code(
    State(state): State<AppState>,
    Path(medium_cd): Path<String>,
) -> Result<Response> {
    let code = state.reference_service.medium_code(&medium_cd).await?;
    Ok((StatusCode::OK, Json(code)).into_response())
}
