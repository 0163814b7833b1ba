//! MCP Server transport builders.
//!
//! This module provides the SSE router used by the HTTP server and the stdio runner.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Router,
};
use futures::{stream::BoxStream, Stream, StreamExt};
use rmcp::{model::ClientJsonRpcMessage, transport::stdio, ServiceExt};
use serde::Deserialize;
use std::{convert::Infallible, sync::Arc};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::constants::{MESSAGE_PATH, SSE_KEEP_ALIVE, SSE_PATH};
use crate::mcp::server::{
    connection_monitor::{ConnectionMonitor, MonitoredStream},
    handler::BoilerplateHandler,
    session::{SessionError, SessionManager},
};
use crate::mcp::McpError;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Creates the router for the SSE transport.
pub fn create_sse_router(manager: Arc<SessionManager>) -> Router {
    log::info!("Creating MCP SSE router component.");

    Router::new()
        .route(SSE_PATH, get(handle_sse_connect))
        .route(MESSAGE_PATH, post(handle_post_message))
        .with_state(manager)
}

async fn handle_sse_connect(
    State(manager): State<Arc<SessionManager>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, SessionError> {
    let session = manager.create_session().await?;
    let endpoint = format!("{}?sessionId={}", MESSAGE_PATH, session.id);
    let session_id = session.id.clone();

    let endpoint_event =
        futures::stream::once(async move { Ok(Event::default().event("endpoint").data(endpoint)) });
    let messages = ReceiverStream::new(session.outbound).filter_map(move |message| {
        let event = Event::default().event("message").json_data(&message);
        let session_id = session_id.clone();
        async move {
            match event {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    log::error!("Failed to encode message for session {}: {}", session_id, e);
                    None
                }
            }
        }
    });

    let stream: BoxStream<'static, Result<Event, Infallible>> =
        endpoint_event.chain(messages).boxed();
    let monitored = MonitoredStream::new(stream, ConnectionMonitor::new(session.ct));

    Ok(Sse::new(monitored).keep_alive(KeepAlive::new().interval(SSE_KEEP_ALIVE)))
}

async fn handle_post_message(
    State(manager): State<Arc<SessionManager>>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, SessionError> {
    let session_id = query.session_id.unwrap_or_default();
    if !manager.has_session(&session_id).await {
        log::warn!("Message for unknown session: {:?}", session_id);
        return Err(SessionError::NotFound(session_id));
    }

    let message: ClientJsonRpcMessage = serde_json::from_slice(&body).map_err(|e| {
        log::warn!("Malformed message for session {}: {}", session_id, e);
        SessionError::InvalidMessage(e.to_string())
    })?;

    manager.route_message(&session_id, message).await?;
    Ok((StatusCode::ACCEPTED, "Accepted"))
}

/// Serves a single protocol session over stdin/stdout until the client leaves or
/// the shutdown token fires.
pub async fn serve_stdio(state: Arc<ServerState>, shutdown: CancellationToken) -> Result<(), McpError> {
    log::info!("Starting MCP server on stdio");

    let ct = shutdown.child_token();
    let running = tokio::select! {
        _ = shutdown.cancelled() => return Ok(()),
        result = BoilerplateHandler::new(state).serve_with_ct(stdio(), ct) => {
            result.map_err(|e| McpError::ServerInitializationError(e.to_string()))?
        }
    };

    let reason = running
        .waiting()
        .await
        .map_err(|e| McpError::ServerInternalError(e.to_string()))?;
    log::info!("stdio session finished: {:?}", reason);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::response::Response;

    const INITIALIZE: &str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"t","version":"0"}}}"#;

    async fn manager() -> Arc<SessionManager> {
        let state = ServerState::new(Arc::new(Config::default())).await.unwrap();
        Arc::new(SessionManager::new(Arc::new(state), CancellationToken::new()))
    }

    async fn post(manager: &Arc<SessionManager>, session_id: Option<&str>, body: &'static str) -> Response {
        handle_post_message(
            State(manager.clone()),
            Query(MessageQuery {
                session_id: session_id.map(str::to_string),
            }),
            Bytes::from_static(body.as_bytes()),
        )
        .await
        .into_response()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_post_without_session_is_rejected() {
        let manager = manager().await;

        let response = post(&manager, None, INITIALIZE).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "No transport found for sessionId");
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn test_post_to_unknown_session_leaves_table_untouched() {
        let manager = manager().await;
        let _session = manager.create_session().await.unwrap();

        let response = post(&manager, Some("unknown"), INITIALIZE).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_post_malformed_body() {
        let manager = manager().await;
        let session = manager.create_session().await.unwrap();

        let response = post(&manager, Some(&session.id), "not json").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.starts_with("Invalid message"));
        assert!(manager.has_session(&session.id).await);
    }

    #[tokio::test]
    async fn test_post_is_accepted() {
        let manager = manager().await;
        let session = manager.create_session().await.unwrap();

        let response = post(&manager, Some(&session.id), INITIALIZE).await;

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(body_text(response).await, "Accepted");
    }

    #[tokio::test]
    async fn test_sse_disconnect_removes_session() {
        let manager = manager().await;

        let response = handle_sse_connect(State(manager.clone()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/event-stream"
        );
        assert_eq!(manager.len().await, 1);

        // Dropping the response body is how a client disconnect looks to the server.
        drop(response);
        let mut remaining = manager.len().await;
        for _ in 0..50 {
            if remaining == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            remaining = manager.len().await;
        }
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_post_after_client_disconnect_is_rejected() {
        let manager = manager().await;
        let session = manager.create_session().await.unwrap();

        // What axum does with the SSE body once the client goes away.
        drop(MonitoredStream::new(
            futures::stream::pending::<()>(),
            ConnectionMonitor::new(session.ct.clone()),
        ));
        let response = post(&manager, Some(&session.id), INITIALIZE).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "No transport found for sessionId");
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn test_post_to_removed_session_leaves_table_untouched() {
        let manager = manager().await;
        let removed = manager.create_session().await.unwrap();
        let _live = manager.create_session().await.unwrap();
        manager.close_session(&removed.id).await;

        let response = post(&manager, Some(&removed.id), INITIALIZE).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(manager.len().await, 1);
    }
}
