//! Health and fallback handlers

use axum::Json;
use serde::Serialize;

use crate::{AppError, SERVICE_NAME};

/// Response for the health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /health - Liveness check (does not touch the upstream)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

/// Any unknown route
pub async fn not_found() -> AppError {
    AppError::not_found("Not found")
}
