use axum::Router;
use harbor_core::controller::{Controller, RouteInfo};

use crate::app::controller::HealthController;
use crate::app::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .merge(HealthController::router())
        .with_state(state)
}

/// Every controller route, relative to the global prefix.
pub fn route_table() -> Vec<RouteInfo> {
    HealthController::routes().to_vec()
}
