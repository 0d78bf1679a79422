//! Server state shared by the handlers.

use std::sync::Arc;

use crate::{
    domain::ConnectionIdFactory,
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, GetServerStatusUseCase,
        RelayMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectClientUseCase（接続のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// RelayMessageUseCase（メッセージ中継のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// DisconnectClientUseCase（切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// GetServerStatusUseCase（サーバー状態取得のユースケース）
    pub get_server_status_usecase: Arc<GetServerStatusUseCase>,
    /// Allocates a handle for every accepted socket
    pub connection_ids: ConnectionIdFactory,
    /// Capacity of each connection's outbound queue
    pub outbound_buffer: usize,
}
