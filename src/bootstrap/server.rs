use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Context;
use harbor_core::config::{EnvSource, ProcessEnv};
use tokio::net::TcpListener;
use utoipa::OpenApi;

use super::app::{GLOBAL_PREFIX, application};
use super::diagnostics::DeploymentReport;
use super::port::resolve_port;
use crate::app::state::AppState;
use crate::config::AppConfig;
use crate::docs::MainApiDoc;
use crate::routes;

pub async fn init_server(config: AppConfig) -> anyhow::Result<()> {
    let listen = resolve_port(ProcessEnv.non_empty("PORT").as_deref(), config.server.port)?;

    DeploymentReport::collect(&config, &ProcessEnv, listen).emit(config.server.deploy_debug);

    let state = AppState::new(config);

    if state.config.server.snapshot {
        for route in routes::route_table() {
            tracing::info!(
                method = route.method,
                path = %format!("{}{}", GLOBAL_PREFIX, route.path),
                handler = route.handler,
                "mapped route"
            );
        }
    }

    // Build the router
    let app = application(routes::routes(state.clone()), MainApiDoc::openapi());

    // Start the server
    let listener = bind(listen.port).await?;
    let local = listener.local_addr()?;

    for line in startup_lines(local, &state.config.environment) {
        tracing::info!("{}", line);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Binds `0.0.0.0:<port>`. Port `0` asks the OS for a free port.
pub async fn bind(port: u16) -> anyhow::Result<TcpListener> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

    TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))
}

pub fn startup_lines(local: SocketAddr, environment: &str) -> [String; 2] {
    [
        format!("Server is running on port {}", local.port()),
        format!("Environment: {}", environment),
    ]
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("cannot listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("cannot listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;

    use harbor_core::config::ConfigBuilder;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::*;

    const NO_VARS: [(&str, &str); 0] = [];

    #[tokio::test]
    async fn binds_on_every_interface() {
        let listener = bind(0).await.unwrap();
        let local = listener.local_addr().unwrap();

        assert_eq!(local.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_ne!(local.port(), 0);
    }

    #[tokio::test]
    async fn port_in_use_is_an_error() {
        let taken = bind(0).await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = bind(port).await.unwrap_err();

        assert_eq!(err.to_string(), format!("cannot bind 0.0.0.0:{}", port));
    }

    #[test]
    fn announces_port_and_environment() {
        let local = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000));

        assert_eq!(
            startup_lines(local, "development"),
            [
                "Server is running on port 3000".to_owned(),
                "Environment: development".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn bound_listener_serves_the_application() {
        let config = AppConfig::build(&NO_VARS).unwrap();
        let app = application(routes::routes(AppState::new(config)), MainApiDoc::openapi());

        let listener = bind(0).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let mut stream = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.unwrap();
        stream
            .write_all(b"GET /api/v1/health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"), "{}", response);
        assert!(response.contains("\"status\":\"ok\""), "{}", response);
    }
}
