mod health;

pub use health::{HealthController, HealthControllerApi};
