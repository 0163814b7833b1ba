//! Session table for the SSE transport.
//!
//! Every SSE connection owns one protocol session: a pair of channels wired into an
//! `rmcp` service running on its own task. POSTed messages are routed to the session
//! by id; everything the service sends back flows out through the SSE stream.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rmcp::{
    model::{ClientJsonRpcMessage, ServerJsonRpcMessage},
    ServiceExt,
};
use rust_i18n::t;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, PollSender};

use crate::constants::SESSION_CHANNEL_CAPACITY;
use crate::mcp::server::handler::BoilerplateHandler;
use crate::state::ServerState;

pub type SessionId = String;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("{}", t!("mcp.session.not_found"))]
    NotFound(SessionId),
    #[error("{}", t!("mcp.session.already_exists", session_id = _0))]
    AlreadyExists(SessionId),
    #[error("{}", t!("mcp.session.invalid_message", error = _0))]
    InvalidMessage(String),
    #[error("{}", t!("mcp.session.transport_closed"))]
    TransportClosed(SessionId),
}

impl SessionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SessionError::NotFound(_) | SessionError::InvalidMessage(_) => StatusCode::BAD_REQUEST,
            SessionError::AlreadyExists(_) | SessionError::TransportClosed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Inbound side of a live session.
struct SessionHandle {
    sender: mpsc::Sender<ClientJsonRpcMessage>,
    ct: CancellationToken,
}

/// A freshly created session as seen by the SSE connection that owns it.
pub struct NewSession {
    pub id: SessionId,
    /// Messages produced by the protocol service, to be written to the SSE stream.
    pub outbound: mpsc::Receiver<ServerJsonRpcMessage>,
    /// Cancelling this token tears the session down.
    pub ct: CancellationToken,
}

pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    state: Arc<ServerState>,
    shutdown: CancellationToken,
}

impl SessionManager {
    pub fn new(state: Arc<ServerState>, shutdown: CancellationToken) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            state,
            shutdown,
        }
    }

    /// Allocates a session id, registers its channels and starts the protocol service.
    pub async fn create_session(self: &Arc<Self>) -> Result<NewSession, SessionError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let (inbound_tx, inbound_rx) = mpsc::channel::<ClientJsonRpcMessage>(SESSION_CHANNEL_CAPACITY);
        let (outbound_tx, outbound_rx) =
            mpsc::channel::<ServerJsonRpcMessage>(SESSION_CHANNEL_CAPACITY);
        let ct = self.shutdown.child_token();

        self.insert(
            id.clone(),
            SessionHandle {
                sender: inbound_tx,
                ct: ct.clone(),
            },
        )
        .await?;

        let transport = (PollSender::new(outbound_tx), ReceiverStream::new(inbound_rx));
        let manager = self.clone();
        let session_id = id.clone();
        let service_ct = ct.clone();
        tokio::spawn(async move {
            manager
                .run_service(session_id.clone(), transport, service_ct)
                .await;
            manager.close_session(&session_id).await;
        });

        log::info!("SSE session established: {} ({} active)", id, self.len().await);
        Ok(NewSession {
            id,
            outbound: outbound_rx,
            ct,
        })
    }

    async fn run_service(
        &self,
        session_id: SessionId,
        transport: (
            PollSender<ServerJsonRpcMessage>,
            ReceiverStream<ClientJsonRpcMessage>,
        ),
        ct: CancellationToken,
    ) {
        let handler = BoilerplateHandler::new(self.state.clone());
        let running = tokio::select! {
            _ = ct.cancelled() => {
                log::debug!("Session {} closed before initialization", session_id);
                return;
            }
            result = handler.serve_with_ct(transport, ct.clone()) => match result {
                Ok(running) => running,
                Err(e) => {
                    log::error!("Failed to initialize session {}: {}", session_id, e);
                    return;
                }
            },
        };

        match running.waiting().await {
            Ok(reason) => log::debug!("Session {} finished: {:?}", session_id, reason),
            Err(e) => log::error!("Session {} task failed: {}", session_id, e),
        }
    }

    async fn insert(&self, id: SessionId, handle: SessionHandle) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&id) {
            return Err(SessionError::AlreadyExists(id));
        }
        sessions.insert(id, handle);
        Ok(())
    }

    /// Delivers one client message to the session's protocol service.
    ///
    /// A session whose service has gone away is removed from the table.
    pub async fn route_message(
        &self,
        id: &str,
        message: ClientJsonRpcMessage,
    ) -> Result<(), SessionError> {
        // The read guard is held across the send so a concurrent close cannot interleave.
        let sessions = self.sessions.read().await;
        let handle = sessions
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        if handle.ct.is_cancelled() {
            drop(sessions);
            self.close_session(id).await;
            return Err(SessionError::NotFound(id.to_string()));
        }
        let delivered = handle.sender.send(message).await.is_ok();
        drop(sessions);

        if !delivered {
            log::warn!("Session {} is no longer accepting messages", id);
            self.close_session(id).await;
            return Err(SessionError::TransportClosed(id.to_string()));
        }
        Ok(())
    }

    /// Removes a session and stops its service. Returns whether the session was present.
    pub async fn close_session(&self, id: &str) -> bool {
        match self.sessions.write().await.remove(id) {
            Some(handle) => {
                handle.ct.cancel();
                log::info!("SSE session closed: {}", id);
                true
            }
            None => false,
        }
    }

    /// Whether `id` names a live session.
    ///
    /// A session whose client has already disconnected is removed on sight.
    pub async fn has_session(&self, id: &str) -> bool {
        let cancelled = match self.sessions.read().await.get(id) {
            Some(handle) => handle.ct.is_cancelled(),
            None => return false,
        };
        if cancelled {
            self.close_session(id).await;
            return false;
        }
        true
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Closes every live session.
    pub async fn close_all(&self) {
        let drained: Vec<(SessionId, SessionHandle)> =
            self.sessions.write().await.drain().collect();
        for (id, handle) in drained {
            handle.ct.cancel();
            log::debug!("Closed session {} on shutdown", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use std::time::Duration;

    async fn manager() -> Arc<SessionManager> {
        let state = ServerState::new(Arc::new(Config::default())).await.unwrap();
        Arc::new(SessionManager::new(Arc::new(state), CancellationToken::new()))
    }

    fn initialize_request() -> ClientJsonRpcMessage {
        serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "test-client", "version": "0.1.0" }
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_each_connection_gets_its_own_session() {
        let manager = manager().await;
        let mut sessions = Vec::new();
        for _ in 0..3 {
            sessions.push(manager.create_session().await.unwrap());
        }

        assert_eq!(manager.len().await, 3);
        assert_ne!(sessions[0].id, sessions[1].id);
        for session in &sessions {
            assert!(manager.has_session(&session.id).await);
        }
    }

    #[tokio::test]
    async fn test_close_session_is_idempotent() {
        let manager = manager().await;
        let session = manager.create_session().await.unwrap();

        assert!(manager.close_session(&session.id).await);
        assert!(!manager.close_session(&session.id).await);
        assert!(session.ct.is_cancelled());
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_session_is_rejected() {
        let manager = manager().await;
        let _session = manager.create_session().await.unwrap();

        let err = manager
            .route_message("does-not-exist", initialize_request())
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::NotFound("does-not-exist".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No transport found for sessionId");
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let manager = manager().await;
        let (sender, _receiver) = mpsc::channel(1);
        let handle = || SessionHandle {
            sender: sender.clone(),
            ct: CancellationToken::new(),
        };

        manager.insert("fixed".to_string(), handle()).await.unwrap();
        let err = manager.insert("fixed".to_string(), handle()).await.unwrap_err();

        assert_eq!(err, SessionError::AlreadyExists("fixed".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_initialize_round_trip() {
        let manager = manager().await;
        let mut session = manager.create_session().await.unwrap();

        manager
            .route_message(&session.id, initialize_request())
            .await
            .unwrap();

        let response = tokio::time::timeout(Duration::from_secs(5), session.outbound.recv())
            .await
            .unwrap()
            .unwrap();
        let value = serde_json::to_value(response).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["result"]["serverInfo"]["name"], "MCP Boilerplate Server");
    }

    #[tokio::test]
    async fn test_shutdown_closes_all_sessions() {
        let manager = manager().await;
        let first = manager.create_session().await.unwrap();
        let second = manager.create_session().await.unwrap();

        manager.close_all().await;

        assert!(manager.is_empty().await);
        assert!(first.ct.is_cancelled());
        assert!(second.ct.is_cancelled());
    }

    #[tokio::test]
    async fn test_close_removes_only_the_matching_session() {
        let manager = manager().await;
        let first = manager.create_session().await.unwrap();
        let second = manager.create_session().await.unwrap();
        let third = manager.create_session().await.unwrap();

        assert!(manager.close_session(&second.id).await);

        assert_eq!(manager.len().await, 2);
        assert!(manager.has_session(&first.id).await);
        assert!(manager.has_session(&third.id).await);
        assert!(!manager.has_session(&second.id).await);
        assert!(!first.ct.is_cancelled());
        assert!(!third.ct.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_session_is_not_routed_to() {
        let manager = manager().await;
        let session = manager.create_session().await.unwrap();
        let other = manager.create_session().await.unwrap();

        session.ct.cancel();
        let err = manager
            .route_message(&session.id, initialize_request())
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::NotFound(session.id.clone()));
        assert!(!manager.has_session(&session.id).await);
        assert!(manager.has_session(&other.id).await);
        assert_eq!(manager.len().await, 1);
    }
}
