use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::constants::{MESSAGE_PATH, SSE_PATH};
use crate::http::error::{HttpError, HttpResult};
use crate::mcp::server::{create_sse_router, SessionManager};
use crate::state::ServerState;

/// Starts the HTTP/SSE transport on `0.0.0.0:<port>` and serves until `shutdown` fires.
///
/// # Arguments
/// * `state` - Shared registries handed to every session.
/// * `shutdown` - Cancelled by the signal handler; closes every session and stops the listener.
pub async fn start_http_server(
    state: Arc<ServerState>,
    shutdown: CancellationToken,
) -> HttpResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        log::error!("Failed to bind {}: {}", addr, e);
        HttpError::StartUp(e.to_string())
    })?;

    // define cors config
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let manager = Arc::new(SessionManager::new(state, shutdown.clone()));
    let app_routes = create_sse_router(manager.clone()).layer(cors);

    log::info!("MCP server listening on http://{}", addr);
    log::debug!("SSE endpoint: http://{}{}", addr, SSE_PATH);
    log::debug!("Message endpoint: http://{}{}", addr, MESSAGE_PATH);

    let server = axum::serve(listener, app_routes).with_graceful_shutdown(async move {
        shutdown.cancelled().await;
        log::info!("HTTP server received shutdown signal");
        manager.close_all().await;
    });

    match server.await {
        Ok(_) => {
            log::info!("HTTP server shut down gracefully");
            Ok(())
        }
        Err(e) => {
            log::error!("HTTP server failed: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_bind_failure_is_a_startup_error() {
        let occupied = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let port = occupied.local_addr().unwrap().port();
        let config = Config {
            port,
            ..Config::default()
        };
        let state = ServerState::new(Arc::new(config)).await.unwrap();

        let err = start_http_server(Arc::new(state), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, HttpError::StartUp(_)));
    }

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let config = Config {
            port: 0,
            ..Config::default()
        };
        let state = ServerState::new(Arc::new(config)).await.unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            start_http_server(Arc::new(state), shutdown),
        )
        .await
        .unwrap();

        assert!(result.is_ok());
    }
}
