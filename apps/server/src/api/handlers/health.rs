use crate::{db, state::AppState, Result};
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// Liveness plus a database round trip.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>> {
    db::ping(&state.db_pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
