//! WebSocket transport.
//!
//! One persistent socket per client at the configured path (default `/mcp`),
//! plus a `/health` route. Each socket gets its own [`Session`]; frames are
//! handled to completion in arrival order.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tower_http::trace::TraceLayer;

use crate::error::McpError;
use crate::protocol::Message;
use crate::server::{McpServer, Session};

/// Create the HTTP router.
pub fn create_router(server: Arc<McpServer>) -> Router {
    let path = server.config().path.clone();
    Router::new()
        .route(&path, get(handle_upgrade))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Bind the configured address and serve until the process is stopped.
pub async fn serve(server: Arc<McpServer>) -> Result<(), McpError> {
    let addr = server.config().bind_addr();
    let path = server.config().path.clone();
    let app = create_router(server);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| McpError::StartupFailed(format!("failed to bind to {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, path = %path, "WebSocket server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(McpError::Io)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

async fn handle_upgrade(
    State(server): State<Arc<McpServer>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let limit = server.config().max_message_size;
    ws.max_message_size(limit)
        .max_frame_size(limit)
        .on_upgrade(move |socket| handle_socket(socket, server))
}

async fn handle_socket(socket: WebSocket, server: Arc<McpServer>) {
    let (mut sender, mut receiver) = socket.split();
    let mut session = Session::new();

    if let Some(greeting) = session.open(&server)
        && send(&mut sender, &greeting).await.is_err()
    {
        session.close();
        return;
    }

    while let Some(frame) = receiver.next().await {
        let text = match frame {
            Ok(WsMessage::Text(text)) => text.as_str().to_owned(),
            Ok(WsMessage::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(WsMessage::Close(_)) => break,
            Ok(WsMessage::Ping(_) | WsMessage::Pong(_)) => continue,
            Err(e) => {
                tracing::warn!(connection_id = %session.id(), error = %e, "WebSocket receive failed");
                break;
            }
        };

        let Some(reply) = session.handle(&server, &text).await else {
            break;
        };
        if send(&mut sender, &reply).await.is_err() {
            break;
        }
    }

    session.close();
}

async fn send<S>(sender: &mut S, message: &Message) -> Result<(), ()>
where
    S: futures::Sink<WsMessage> + Unpin,
{
    let text = match message.encode() {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode reply");
            return Err(());
        }
    };
    sender.send(WsMessage::Text(text.into())).await.map_err(|_| ())
}

/// Handle health check requests.
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "kdbm",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
