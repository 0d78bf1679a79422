//! UseCase: 切断処理
//!
//! 切断した接続は既に居ないので、`client_left` は残っている全ての登録済み接続に送ります。
//! 未登録の接続（既に処理済みを含む）に対しては何もしません（冪等）。
//! 接続処理と同じ入退室ゲートを通るため、接続処理の途中に割り込むことはありません。

use std::sync::Arc;

use hatake_shared::time::Clock;

use crate::{
    domain::{ClientInfo, ClientRegistry, ConnectionId, MessagePusher, Timestamp},
    infrastructure::dto::envelope::Envelope,
};

use super::{Broadcaster, MembershipGate, encode_envelope};

/// 切断のユースケース
pub struct DisconnectClientUseCase {
    registry: Arc<dyn ClientRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: Arc<Broadcaster>,
    gate: Arc<MembershipGate>,
    clock: Arc<dyn Clock>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(
        registry: Arc<dyn ClientRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        broadcaster: Arc<Broadcaster>,
        gate: Arc<MembershipGate>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            broadcaster,
            gate,
            clock,
        }
    }

    /// 切断処理を実行
    ///
    /// # Returns
    ///
    /// * `Some(ClientInfo)` - 登録されていた接続のレコード
    /// * `None` - 未登録だった（ブロードキャストは行わない）
    pub async fn execute(&self, connection: ConnectionId) -> Option<ClientInfo> {
        let _pass = self.gate.pass().await;
        self.message_pusher.unregister_client(connection).await;

        let info = self.registry.deregister(connection).await?;

        let client_id = info.id;
        let timestamp = Timestamp::new(self.clock.now());
        let outcome = self
            .broadcaster
            .broadcast_with_online_count(None, |online| {
                encode_envelope(&Envelope::client_left(client_id, online, timestamp))
            })
            .await;

        tracing::info!(
            "Client {} disconnected, online: {}",
            client_id,
            outcome.online_count
        );

        Some(info)
    }
}
