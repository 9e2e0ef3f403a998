use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Static liveness payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok".to_string() }
    }
}
