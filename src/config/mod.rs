mod app;
mod error;

pub use app::{AppConfig, DatabaseConfig, GcsConfig, JwtConfig, ServerConfig};
pub use error::ConfigError;
