use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;

/// Services shared by every handler, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState {
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
