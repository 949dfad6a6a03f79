use axum::{Json, extract::State};
use harbor_core::response::StandardErrors;

use crate::app::response::HealthResponse;
use crate::app::state::AppState;

pub struct HealthController;

#[harbor_macros::controller(state = AppState)]
impl HealthController {
    #[harbor_macros::get("/health")]
    #[harbor_macros::utoipa_response(status = 200, body = HealthResponse, description = "Service is up")]
    #[harbor_macros::utoipa_response(response = StandardErrors)]
    pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "ok".into(),
            environment: state.config.environment.clone(),
            version: env!("CARGO_PKG_VERSION").into(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
        })
    }
}
