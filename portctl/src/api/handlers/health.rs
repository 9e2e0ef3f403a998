use crate::api::models::health::HealthResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Liveness check",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
