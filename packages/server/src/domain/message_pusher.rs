//! MessagePusher trait 定義
//!
//! 個々の接続へのメッセージ送信（通知）のインターフェースを定義します。
//! WebSocket 以外のトランスポートに差し替えられるよう、ドメイン層は具体実装に依存しません。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// 接続ごとの送信キュー（有界）
pub type PusherChannel = mpsc::Sender<String>;

/// MessagePusher trait
///
/// 送信はキューへの投入のみで完了し、遅いピアが他のピアへの配送をブロックすることはない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信キューを登録
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel);

    /// 接続の送信キューを登録解除
    async fn unregister_client(&self, connection: ConnectionId);

    /// 接続の送信キューが登録されているか（トランスポートが開いているか）
    async fn is_attached(&self, connection: ConnectionId) -> bool;

    /// 特定の接続にメッセージを送信
    ///
    /// キューが満杯の場合、その接続の送信キューは破棄され（切断扱い）、
    /// `MessagePushError::QueueFull` が返される。
    async fn push_to(&self, connection: ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// 全ての送信キューを閉じる
    ///
    /// 各接続の送信タスクはキューに残ったメッセージを送り切ってから接続を閉じる。
    /// 閉じたキューの数を返す。
    async fn close_all(&self) -> usize;
}
