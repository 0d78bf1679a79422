//! Server execution logic.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    domain::ConnectionIdFactory,
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, GetServerStatusUseCase,
        RelayMessageUseCase, ShutdownServerUseCase,
    },
};

use super::{
    error::ServerError,
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// How long to wait for connection tasks to flush the shutdown notice and close.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Listener and queue settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,
    /// Port number to bind to (e.g., 8080)
    pub port: u16,
    /// Capacity of each connection's outbound queue
    pub outbound_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            outbound_buffer: 256,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// WebSocket relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_client_usecase,
///     relay_message_usecase,
///     disconnect_client_usecase,
///     shutdown_server_usecase,
///     get_server_status_usecase,
///     256,
/// );
/// server.run(&ServerConfig::default()).await?;
/// ```
pub struct Server {
    connect_client_usecase: Arc<ConnectClientUseCase>,
    relay_message_usecase: Arc<RelayMessageUseCase>,
    disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    shutdown_server_usecase: Arc<ShutdownServerUseCase>,
    get_server_status_usecase: Arc<GetServerStatusUseCase>,
    outbound_buffer: usize,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        connect_client_usecase: Arc<ConnectClientUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        disconnect_client_usecase: Arc<DisconnectClientUseCase>,
        shutdown_server_usecase: Arc<ShutdownServerUseCase>,
        get_server_status_usecase: Arc<GetServerStatusUseCase>,
        outbound_buffer: usize,
    ) -> Self {
        Self {
            connect_client_usecase,
            relay_message_usecase,
            disconnect_client_usecase,
            shutdown_server_usecase,
            get_server_status_usecase,
            outbound_buffer,
        }
    }

    /// Bind to the configured address and serve until SIGINT/SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound, or
    /// [`ServerError::Serve`] if the accept loop fails.
    pub async fn run(self, config: &ServerConfig) -> Result<(), ServerError> {
        let bind_addr = config.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `signal` resolves.
    ///
    /// On shutdown every peer is sent `server_shutdown`, all connections are closed and
    /// this returns once they have drained (or after a bounded wait).
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        let shutdown_server_usecase = self.shutdown_server_usecase;
        let get_server_status_usecase = self.get_server_status_usecase;

        let app_state = Arc::new(AppState {
            connect_client_usecase: self.connect_client_usecase,
            relay_message_usecase: self.relay_message_usecase,
            disconnect_client_usecase: self.disconnect_client_usecase,
            get_server_status_usecase: get_server_status_usecase.clone(),
            connection_ids: ConnectionIdFactory::new(),
            outbound_buffer: self.outbound_buffer,
        });

        let app = Router::new()
            // WebSocket エンドポイント
            .route("/", get(websocket_handler))
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        tracing::info!("WebSocket relay server listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}", local_addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            signal.await;
            shutdown_server_usecase.execute().await;
        })
        .await?;

        drain_connections(&get_server_status_usecase).await;
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Wait until every connection task has run its close sequence.
async fn drain_connections(status: &GetServerStatusUseCase) {
    let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while status.execute().await > 0 {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    })
    .await;

    if drained.is_err() {
        let remaining = status.execute().await;
        tracing::warn!(
            "{} connections still open after {:?}, exiting anyway",
            remaining,
            DRAIN_TIMEOUT
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // テスト項目: デフォルト設定で全インターフェースの 8080 番にバインドする
        // given (前提条件):
        let config = ServerConfig::default();

        // when (操作):
        let addr = config.bind_addr();

        // then (期待する結果):
        assert_eq!(addr, "0.0.0.0:8080");
        assert_eq!(config.outbound_buffer, 256);
    }
}
