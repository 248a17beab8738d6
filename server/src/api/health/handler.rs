//! Health Handlers

use axum::Json;
use serde::Serialize;

use crate::utils::time::now_millis;
use crate::utils::{AppResponse, ok};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: i64,
}

/// Liveness probe
pub async fn health() -> Json<AppResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        timestamp: now_millis(),
    })
}
