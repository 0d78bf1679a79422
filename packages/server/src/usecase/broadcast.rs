//! Broadcast Engine
//!
//! Registry のメンバーへ 1 つのメッセージを配送します。
//! 個々の宛先への送信失敗はここで捕捉してログに残し、残りの宛先への配送は続けます。

use std::sync::Arc;

use crate::domain::{ClientRegistry, ConnectionId, Member, MessagePushError, MessagePusher};

/// 1 回のブロードキャストの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// 配送時点の登録数（スナップショットの大きさ）
    pub online_count: usize,
    /// キューへの投入に成功した宛先の数
    pub delivered: usize,
}

/// ブロードキャストエンジン
pub struct Broadcaster {
    /// Registry（接続登録簿の抽象化）
    registry: Arc<dyn ClientRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl Broadcaster {
    /// 新しい Broadcaster を作成
    pub fn new(registry: Arc<dyn ClientRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 送信者以外の全ての登録済み接続に配送する
    ///
    /// # Returns
    ///
    /// 投入に成功した宛先の数
    pub async fn broadcast_excluding(&self, payload: &str, sender: ConnectionId) -> usize {
        let members = self.registry.members().await;
        self.deliver(&members, payload, Some(sender)).await
    }

    /// 全ての登録済み接続に配送する（シャットダウン通知用）
    pub async fn broadcast_to_all(&self, payload: &str) -> usize {
        let members = self.registry.members().await;
        self.deliver(&members, payload, None).await
    }

    /// Registry のスナップショットを 1 度だけ取り、その大きさを onlineCount として
    /// `build` でメッセージを組み立ててから、同じスナップショットに配送する
    ///
    /// onlineCount と実際の宛先集合が食い違わないようにするための形。
    /// `build` が `None` を返した場合は何も送らない。
    pub async fn broadcast_with_online_count<F>(
        &self,
        exclude: Option<ConnectionId>,
        build: F,
    ) -> BroadcastOutcome
    where
        F: FnOnce(usize) -> Option<String>,
    {
        let members = self.registry.members().await;
        let online_count = members.len();
        let delivered = match build(online_count) {
            Some(payload) => self.deliver(&members, &payload, exclude).await,
            None => 0,
        };
        BroadcastOutcome {
            online_count,
            delivered,
        }
    }

    async fn deliver(
        &self,
        members: &[Member],
        payload: &str,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let mut delivered = 0;

        for member in members {
            if Some(member.connection) == exclude {
                continue;
            }
            match self.message_pusher.push_to(member.connection, payload).await {
                Ok(()) => delivered += 1,
                // まだ送信キューが接続されていない（open 前）または既に外れている
                Err(MessagePushError::ClientNotFound(_)) => {
                    tracing::debug!("Client {} is not open, skipping", member.info.id);
                }
                Err(e) => {
                    tracing::warn!("Failed to deliver to client {}: {}", member.info.id, e);
                }
            }
        }

        delivered
    }
}
