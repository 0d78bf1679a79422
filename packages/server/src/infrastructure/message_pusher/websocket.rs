//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの有界な送信キュー（`mpsc::Sender<String>`）を管理
//! - クライアントへのメッセージ投入（push_to）と一斉クローズ（close_all）
//!
//! ## 設計ノート
//!
//! WebSocket の受付とキューの受信側（送信タスク）は UI 層（`ui/handler/websocket.rs`）が持ちます。
//! この実装はキューの送信側だけを保持し、`try_send` で投入するため呼び出し側をブロックしません。
//!
//! キューが満杯になった接続は送信側をここで破棄します。送信側はこのマップだけが持つので、
//! 破棄するとキューが閉じ、送信タスクは残りを送り切ってから終了し、通常の切断処理が走ります。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let clients = Arc::new(Mutex::new(HashMap::new()));
/// let pusher = WebSocketMessagePusher::new(clients.clone());
///
/// pusher.push_to(connection, "{\"type\":\"system\"}").await?;
/// ```
pub struct WebSocketMessagePusher {
    /// 接続中の WebSocket の送信キュー
    ///
    /// Key: ConnectionId
    /// Value: PusherChannel
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new(clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection, sender);
        tracing::debug!("{} attached to MessagePusher", connection);
    }

    async fn unregister_client(&self, connection: ConnectionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(&connection).is_some() {
            tracing::debug!("{} detached from MessagePusher", connection);
        }
    }

    async fn is_attached(&self, connection: ConnectionId) -> bool {
        self.clients.lock().await.contains_key(&connection)
    }

    async fn push_to(
        &self,
        connection: ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let mut clients = self.clients.lock().await;

        let Some(sender) = clients.get(&connection) else {
            return Err(MessagePushError::ClientNotFound(connection));
        };

        match sender.try_send(content.to_string()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                clients.remove(&connection);
                tracing::warn!(
                    "Outbound queue of {} is full; dropping the connection",
                    connection
                );
                Err(MessagePushError::QueueFull(connection))
            }
            Err(TrySendError::Closed(_)) => {
                clients.remove(&connection);
                Err(MessagePushError::ConnectionClosed(connection))
            }
        }
    }

    async fn close_all(&self) -> usize {
        let mut clients = self.clients.lock().await;
        let closed = clients.len();
        clients.clear();
        tracing::debug!("Closed {} outbound queues", closed);
        closed
    }
}
