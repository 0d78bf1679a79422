//! WebSocket connection handlers.
//!
//! Each accepted socket runs two tasks: a receiver loop that feeds inbound frames to the
//! relay use case in arrival order, and a pusher loop that drains the connection's bounded
//! outbound queue into the socket. When either finishes the other is aborted, and the
//! disconnect use case runs once the aborted task has stopped, so no inbound frame is
//! relayed after the connection has been deregistered.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ClientId, ConnectionId, RemoteAddress},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    let remote_address = RemoteAddress::from_socket_addr(Some(addr));
    ws.on_failed_upgrade(move |e| {
        tracing::warn!("WebSocket upgrade from {} failed: {}", addr, e);
    })
    .on_upgrade(move |socket| handle_socket(socket, state, remote_address))
}

/// Spawns a task that drains the outbound queue into the WebSocket sink.
///
/// When the queue is closed (shutdown, overflow or a refused connection) the remaining
/// frames are flushed and a Close frame is sent.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    connection: ConnectionId,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(msg.into())).await {
                tracing::warn!("Failed to write to {}: {}", connection, e);
                return;
            }
        }
        tracing::debug!("Outbound queue of {} closed", connection);
        let _ = sender.send(Message::Close(None)).await;
    })
}

/// Spawns a task that relays inbound frames from this connection.
fn receiver_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    connection: ConnectionId,
    remote_address: RemoteAddress,
    client_id: ClientId,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("Transport error on client {}: {}", client_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    state
                        .relay_message_usecase
                        .execute(connection, remote_address.clone(), text.as_str())
                        .await;
                }
                Message::Binary(data) => {
                    let text = String::from_utf8_lossy(&data);
                    state
                        .relay_message_usecase
                        .execute(connection, remote_address.clone(), &text)
                        .await;
                }
                Message::Close(_) => {
                    tracing::debug!("Client {} requested close", client_id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, remote_address: RemoteAddress) {
    let connection = state.connection_ids.generate();
    let (tx, rx) = mpsc::channel(state.outbound_buffer.max(1));
    let (sender, receiver) = socket.split();

    let connected = state
        .connect_client_usecase
        .execute(connection, remote_address.clone(), tx)
        .await;
    let mut send_task = pusher_loop(rx, sender, connection);

    let Some(connected) = connected else {
        // Shutting down: only the notice is queued, flush it and close.
        let _ = send_task.await;
        return;
    };
    let client_id = connected.info.id;

    let mut recv_task = receiver_loop(
        receiver,
        state.clone(),
        connection,
        remote_address,
        client_id,
    );

    // If any one of the tasks completes, abort the other
    let other = tokio::select! {
        _ = &mut recv_task => send_task,
        _ = &mut send_task => recv_task,
    };
    other.abort();
    // An aborted task may still be mid-poll on another worker; wait until it has stopped
    let _ = other.await;

    state.disconnect_client_usecase.execute(connection).await;
}
