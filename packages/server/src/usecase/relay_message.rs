//! UseCase: メッセージ中継処理
//!
//! 受信データをデコードして `forward` に包み、送信者以外の全員にブロードキャストした後、
//! 送信者へ `system/message_sent` を返します（確認応答は助言的なもので、失敗は無視する）。
//!
//! Registry に無い接続は、送信キューが MessagePusher に接続されている（トランスポートが開いている）
//! 場合に限りここで登録します。既に切断処理を終えた接続から遅れて届いたデータは破棄します。

use std::sync::Arc;

use hatake_shared::time::Clock;

use crate::{
    domain::{ClientId, ClientRegistry, ConnectionId, MessagePusher, RemoteAddress, Timestamp},
    infrastructure::{codec, dto::envelope::Envelope},
};

use super::{Broadcaster, encode_envelope};

/// 中継処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOutcome {
    pub from: ClientId,
    /// forward の投入に成功した宛先の数
    pub delivered: usize,
    /// 確認応答に載せた recipientCount
    pub recipient_count: usize,
}

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    registry: Arc<dyn ClientRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl RelayMessageUseCase {
    /// 新しい RelayMessageUseCase を作成
    pub fn new(
        registry: Arc<dyn ClientRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            broadcaster,
            clock,
        }
    }

    /// メッセージ中継を実行
    ///
    /// 接続が未登録であればここで登録する（open 通知が処理される前に届いたメッセージ）。
    /// 切断済みの接続からのデータは中継せず `None` を返す。
    ///
    /// # Arguments
    ///
    /// * `connection` - 送信元の接続ハンドル
    /// * `remote_address` - 遅延登録時に使う送信元アドレス
    /// * `raw` - 受信したデータ（テキスト）
    pub async fn execute(
        &self,
        connection: ConnectionId,
        remote_address: RemoteAddress,
        raw: &str,
    ) -> Option<RelayOutcome> {
        let info = match self.registry.lookup(connection).await {
            Some(info) => info,
            None if self.message_pusher.is_attached(connection).await => {
                self.registry.register(connection, remote_address).await
            }
            None => {
                tracing::debug!("Dropping data from closed {}", connection);
                return None;
            }
        };

        let online_count = self.registry.size().await;
        tracing::info!(
            "Message from client {}: {}, online: {}",
            info.id,
            raw,
            online_count
        );

        let data = codec::decode(raw);
        let forward = Envelope::forward(&info, data, self.now());
        let delivered = match encode_envelope(&forward) {
            Some(payload) => {
                self.broadcaster
                    .broadcast_excluding(&payload, connection)
                    .await
            }
            None => 0,
        };

        let recipient_count = self.registry.size().await.saturating_sub(1);
        if let Some(payload) = encode_envelope(&Envelope::message_sent(recipient_count, self.now()))
        {
            // 確認応答は助言的なものなので失敗しても何もしない
            let _ = self.message_pusher.push_to(connection, &payload).await;
        }

        Some(RelayOutcome {
            from: info.id,
            delivered,
            recipient_count,
        })
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now())
    }
}
