//! UseCase: 接続処理
//!
//! ## 処理の順序
//!
//! 1. 入退室ゲートを通る（閉じていれば `system/server_shutdown` だけを積んで終了）
//! 2. Registry に登録（冪等）
//! 3. 新しい接続の送信キューに `system/connected` を積む
//! 4. 送信キューを MessagePusher に接続する
//! 5. 他の全員に `system/client_joined` をブロードキャスト
//!
//! 3 を 4 より先に行うため、welcome は必ずその接続が受け取る最初のフレームになる。
//! 1 から 5 まではゲートを保持したまま行うので、welcome の onlineCount と
//! その後に届く client_joined / client_left の間に取りこぼしは生じない。

use std::sync::Arc;

use hatake_shared::time::Clock;

use crate::{
    domain::{
        ClientInfo, ClientRegistry, ConnectionId, MessagePusher, PusherChannel, RemoteAddress,
        Timestamp,
    },
    infrastructure::dto::envelope::Envelope,
};

use super::{Broadcaster, MembershipGate, encode_envelope};

/// 接続処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connected {
    pub info: ClientInfo,
    /// welcome に載せた onlineCount
    pub online_count: usize,
}

/// 接続のユースケース
pub struct ConnectClientUseCase {
    registry: Arc<dyn ClientRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: Arc<Broadcaster>,
    gate: Arc<MembershipGate>,
    clock: Arc<dyn Clock>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
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

    /// 接続処理を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - トランスポートが割り当てた接続ハンドル
    /// * `remote_address` - ピアのアドレス（取得できなければ unknown）
    /// * `sender` - この接続の送信キュー
    ///
    /// # Returns
    ///
    /// * `Some(Connected)` - 登録された
    /// * `None` - シャットダウン中のため登録しなかった。`sender` には
    ///   `system/server_shutdown` だけが積まれ、戻った時点でキューは閉じている
    pub async fn execute(
        &self,
        connection: ConnectionId,
        remote_address: RemoteAddress,
        sender: PusherChannel,
    ) -> Option<Connected> {
        let Some(_pass) = self.gate.admit().await else {
            tracing::info!("Refusing {} from {}: shutting down", connection, remote_address);
            if let Some(payload) = encode_envelope(&Envelope::server_shutdown(self.now())) {
                let _ = sender.try_send(payload);
            }
            return None;
        };

        let info = self.registry.register(connection, remote_address).await;
        let online_count = self.registry.size().await;

        let welcome = Envelope::connected(info.id, online_count, self.now());
        if let Some(payload) = encode_envelope(&welcome)
            && let Err(e) = sender.try_send(payload)
        {
            tracing::error!("Failed to send welcome to client {}: {}", info.id, e);
        }
        self.message_pusher.register_client(connection, sender).await;

        tracing::info!(
            "Client {} connected (IP: {}), online: {}",
            info.id,
            info.remote_address,
            online_count
        );

        let client_id = info.id;
        let timestamp = self.now();
        let outcome = self
            .broadcaster
            .broadcast_with_online_count(Some(connection), |online| {
                encode_envelope(&Envelope::client_joined(client_id, online, timestamp))
            })
            .await;
        tracing::debug!(
            "Announced client {} to {} peers",
            client_id,
            outcome.delivered
        );

        Some(Connected { info, online_count })
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::ClientId,
        usecase::test_support::{FIXED_ISO8601, TestHarness, TestPeer},
    };
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    fn create_usecase(harness: &TestHarness) -> ConnectClientUseCase {
        ConnectClientUseCase::new(
            harness.registry.clone(),
            harness.message_pusher.clone(),
            harness.broadcaster.clone(),
            harness.gate.clone(),
            harness.clock.clone(),
        )
    }

    async fn connect(usecase: &ConnectClientUseCase, connection: u64) -> (Connected, TestPeer) {
        let connection = ConnectionId::new(connection);
        let (tx, rx) = mpsc::channel(16);
        let connected = usecase
            .execute(connection, RemoteAddress::new("192.168.0.10"), tx)
            .await
            .expect("gate is open");
        (connected, TestPeer { connection, rx })
    }

    #[tokio::test]
    async fn test_connect_sends_welcome() {
        // テスト項目: 接続した本人に connected が届く
        // given (前提条件):
        let harness = TestHarness::new();
        let usecase = create_usecase(&harness);

        // when (操作):
        let (connected, mut peer) = connect(&usecase, 1).await;

        // then (期待する結果):
        assert_eq!(connected.info.id, ClientId::new(1));
        assert_eq!(connected.online_count, 1);
        assert_eq!(
            peer.drain_json(),
            vec![json!({
                "type": "system",
                "action": "connected",
                "clientId": 1,
                "message": "connected, clientId: 1",
                "onlineCount": 1,
                "timestamp": FIXED_ISO8601
            })]
        );
    }

    #[tokio::test]
    async fn test_connect_announces_to_existing_peers() {
        // テスト項目: 既存の接続に client_joined が届き、本人には届かない
        // given (前提条件):
        let harness = TestHarness::new();
        let usecase = create_usecase(&harness);
        let (_, mut first) = connect(&usecase, 1).await;
        first.drain();

        // when (操作):
        let (connected, mut second) = connect(&usecase, 2).await;

        // then (期待する結果):
        assert_eq!(connected.online_count, 2);
        assert_eq!(
            first.drain_json(),
            vec![json!({
                "type": "system",
                "action": "client_joined",
                "clientId": 2,
                "onlineCount": 2,
                "timestamp": FIXED_ISO8601
            })]
        );
        let own = second.drain_json();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0]["action"], "connected");
    }

    #[tokio::test]
    async fn test_online_count_grows_with_each_connect() {
        // テスト項目: A, B, C の順に接続すると welcome の onlineCount が 1, 2, 3 になる
        // given (前提条件):
        let harness = TestHarness::new();
        let usecase = create_usecase(&harness);

        // when (操作):
        let (a, mut peer_a) = connect(&usecase, 1).await;
        let (b, _) = connect(&usecase, 2).await;
        let (c, _) = connect(&usecase, 3).await;

        // then (期待する結果):
        assert_eq!(
            (a.online_count, b.online_count, c.online_count),
            (1, 2, 3)
        );
        // A は自分の welcome と、後から来た 2 人分の client_joined を受け取る
        let actions: Vec<Value> = peer_a
            .drain_json()
            .into_iter()
            .map(|v| v["action"].clone())
            .collect();
        assert_eq!(
            actions,
            vec![json!("connected"), json!("client_joined"), json!("client_joined")]
        );
    }

    #[tokio::test]
    async fn test_connect_waits_for_membership_gate() {
        // テスト項目: 他の入退室がゲートを保持している間、接続処理は登録まで進まない
        // given (前提条件):
        let harness = TestHarness::new();
        let usecase = Arc::new(create_usecase(&harness));
        let pass = harness.gate.pass().await;
        let (tx, mut rx) = mpsc::channel(16);
        let task = {
            let usecase = usecase.clone();
            tokio::spawn(async move {
                usecase
                    .execute(ConnectionId::new(1), RemoteAddress::unknown(), tx)
                    .await
            })
        };

        // when (操作):
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let size_while_held = harness.registry.size().await;
        drop(pass);
        let connected = task.await.unwrap();

        // then (期待する結果):
        assert_eq!(size_while_held, 0);
        assert_eq!(connected.map(|c| c.online_count), Some(1));
        let welcome: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(welcome["action"], "connected");
    }

    #[tokio::test]
    async fn test_connect_after_gate_closed_is_refused() {
        // テスト項目: ゲートが閉じた後の接続は登録されず、server_shutdown だけを受け取ってキューが閉じる
        // given (前提条件):
        let harness = TestHarness::new();
        let usecase = create_usecase(&harness);
        let mut existing = harness.open(1).await;
        drop(harness.gate.close().await);
        let (tx, rx) = mpsc::channel(16);
        let mut peer = TestPeer {
            connection: ConnectionId::new(2),
            rx,
        };

        // when (操作):
        let connected = usecase
            .execute(peer.connection, RemoteAddress::unknown(), tx)
            .await;

        // then (期待する結果):
        assert_eq!(connected, None);
        assert_eq!(harness.registry.size().await, 1);
        assert!(!harness.message_pusher.is_attached(peer.connection).await);
        assert_eq!(
            peer.drain_json(),
            vec![json!({
                "type": "system",
                "action": "server_shutdown",
                "message": "server_shutdown",
                "timestamp": FIXED_ISO8601
            })]
        );
        assert_eq!(peer.rx.recv().await, None);
        assert!(existing.drain().is_empty());
    }
}
