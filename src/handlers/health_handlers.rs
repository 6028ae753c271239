use axum::Json;

use crate::dto::HealthResponse;

/// Handler for `GET /api/health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Evento API is running".to_string(),
    })
}
