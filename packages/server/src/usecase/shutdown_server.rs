//! UseCase: シャットダウン処理
//!
//! 入退室ゲートを閉じてから、全員に `system/server_shutdown` を送り、全ての送信キューを閉じます。
//! 各接続の送信タスクは通知を送り切ってから接続を閉じます。
//! ゲートを閉じた後に来た接続は登録されず、接続処理が通知だけを返します。

use std::sync::Arc;

use hatake_shared::time::Clock;

use crate::{
    domain::{ClientRegistry, MessagePusher, Timestamp},
    infrastructure::dto::envelope::Envelope,
};

use super::{Broadcaster, MembershipGate, encode_envelope};

/// シャットダウンのユースケース
pub struct ShutdownServerUseCase {
    registry: Arc<dyn ClientRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: Arc<Broadcaster>,
    gate: Arc<MembershipGate>,
    clock: Arc<dyn Clock>,
}

impl ShutdownServerUseCase {
    /// 新しい ShutdownServerUseCase を作成
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

    /// シャットダウン処理を実行
    ///
    /// # Returns
    ///
    /// 通知を投入できた接続の数
    pub async fn execute(&self) -> usize {
        let _pass = self.gate.close().await;
        let online_count = self.registry.size().await;
        tracing::info!("Shutting down, notifying {} clients", online_count);

        let notice = Envelope::server_shutdown(Timestamp::new(self.clock.now()));
        let notified = match encode_envelope(&notice) {
            Some(payload) => self.broadcaster.broadcast_to_all(&payload).await,
            None => 0,
        };

        let closed = self.message_pusher.close_all().await;
        tracing::info!(
            "Shutdown notice delivered to {} clients, {} connections closing",
            notified,
            closed
        );

        notified
    }
}
