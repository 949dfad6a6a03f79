mod app;
pub mod cors;
pub mod diagnostics;
mod env;
pub mod port;
mod server;
mod tracing;

use harbor_core::config::ConfigBuilder;

pub use app::{GLOBAL_PREFIX, application};
pub use server::{bind, init_server, startup_lines};

use crate::config::AppConfig;

pub async fn init_base() -> anyhow::Result<()> {
    let dotenv = env::init_env().await;
    tracing::init_tracing().await;

    match dotenv? {
        Some(path) => ::tracing::debug!("loaded environment from {}", path.display()),
        None => ::tracing::debug!("no .env file found"),
    }

    Ok(())
}

/// Runs the whole startup sequence and serves until shutdown.
pub async fn run() -> anyhow::Result<()> {
    init_base().await?;

    let config = AppConfig::from_process_env()?;

    init_server(config).await
}
