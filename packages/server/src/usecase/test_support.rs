//! UseCase テスト用のヘルパー

use std::{collections::HashMap, sync::Arc};

use hatake_shared::time::FixedClock;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{ClientRegistry, ConnectionId, MessagePusher, RemoteAddress},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryClientRegistry},
};

use super::{Broadcaster, MembershipGate};

/// 2023-01-01T00:00:00.000Z
pub const FIXED_MILLIS: i64 = 1_672_531_200_000;
pub const FIXED_ISO8601: &str = "2023-01-01T00:00:00.000Z";

/// 実装（InMemory Registry + WebSocket MessagePusher）を組み立てたテスト環境
pub struct TestHarness {
    pub clock: Arc<FixedClock>,
    pub registry: Arc<InMemoryClientRegistry>,
    pub message_pusher: Arc<WebSocketMessagePusher>,
    pub broadcaster: Arc<Broadcaster>,
    pub gate: Arc<MembershipGate>,
}

/// テスト用のピア（送信キューの受信側）
pub struct TestPeer {
    pub connection: ConnectionId,
    pub rx: mpsc::Receiver<String>,
}

impl TestPeer {
    /// キューに溜まっているメッセージを全て取り出す
    pub fn drain(&mut self) -> Vec<String> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// キューに溜まっているメッセージを JSON として全て取り出す
    pub fn drain_json(&mut self) -> Vec<Value> {
        self.drain()
            .iter()
            .map(|message| serde_json::from_str(message).unwrap())
            .collect()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        let clock = Arc::new(FixedClock::new(FIXED_MILLIS));
        let registry = Arc::new(InMemoryClientRegistry::new(clock.clone()));
        let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));
        let broadcaster = Arc::new(Broadcaster::new(
            registry.clone(),
            message_pusher.clone(),
        ));
        Self {
            clock,
            registry,
            message_pusher,
            broadcaster,
            gate: Arc::new(MembershipGate::new()),
        }
    }

    /// 接続を登録し、送信キューを接続したピアを返す（ライフサイクルのメッセージは送らない）
    pub async fn open(&self, connection: u64) -> TestPeer {
        let peer = self.attach(connection).await;
        self.registry
            .register(peer.connection, RemoteAddress::new("127.0.0.1"))
            .await;
        peer
    }

    /// 送信キューだけを接続したピアを返す（Registry には登録しない）
    pub async fn attach(&self, connection: u64) -> TestPeer {
        let connection = ConnectionId::new(connection);
        let (tx, rx) = mpsc::channel(16);
        self.message_pusher.register_client(connection, tx).await;
        TestPeer { connection, rx }
    }
}
