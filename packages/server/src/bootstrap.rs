//! Composition root: wires the in-memory registry, the WebSocket pusher and the use cases
//! into a [`Server`].

use std::{collections::HashMap, sync::Arc};

use hatake_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryClientRegistry},
    ui::{Server, ServerConfig},
    usecase::{
        Broadcaster, ConnectClientUseCase, DisconnectClientUseCase, GetServerStatusUseCase,
        MembershipGate, RelayMessageUseCase, ShutdownServerUseCase,
    },
};

/// Build a relay server backed by the in-memory registry.
pub fn build_server(config: &ServerConfig, clock: Arc<dyn Clock>) -> Server {
    // Initialize dependencies in order:
    // 1. Registry
    // 2. MessagePusher
    // 3. Broadcaster
    // 4. MembershipGate
    // 5. UseCases
    // 6. Server

    // 1. Create Registry (in-memory, one per process)
    let registry = Arc::new(InMemoryClientRegistry::new(clock.clone()));

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
        HashMap::new(),
    ))));

    // 3. Create Broadcaster
    let broadcaster = Arc::new(Broadcaster::new(
        registry.clone(),
        message_pusher.clone(),
    ));

    // 4. Create MembershipGate (shared by connect, disconnect and shutdown)
    let gate = Arc::new(MembershipGate::new());

    // 5. Create UseCases
    let connect_client_usecase = Arc::new(ConnectClientUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        broadcaster.clone(),
        gate.clone(),
        clock.clone(),
    ));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        broadcaster.clone(),
        clock.clone(),
    ));
    let disconnect_client_usecase = Arc::new(DisconnectClientUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        broadcaster.clone(),
        gate.clone(),
        clock.clone(),
    ));
    let shutdown_server_usecase = Arc::new(ShutdownServerUseCase::new(
        registry.clone(),
        message_pusher,
        broadcaster,
        gate,
        clock,
    ));
    let get_server_status_usecase = Arc::new(GetServerStatusUseCase::new(registry));

    // 6. Create the server
    Server::new(
        connect_client_usecase,
        relay_message_usecase,
        disconnect_client_usecase,
        shutdown_server_usecase,
        get_server_status_usecase,
        config.outbound_buffer,
    )
}
