//! Health and readiness probes

use axum::extract::State;
use serde::Serialize;
use tracing::error;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
}

/// Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "ok",
    })
}

/// Readiness probe: verifies database connectivity
pub async fn ready(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, "readiness probe failed");
            ApiError::internal("Database unavailable")
        })?;

    Ok(Json(HealthResponse {
        success: true,
        status: "ready",
    }))
}
