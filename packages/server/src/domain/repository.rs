//! Repository trait 定義
//!
//! 接続中ピアの登録簿（Connection Registry）へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ClientInfo, ConnectionId, Member, RemoteAddress};

/// Connection Registry trait
///
/// 接続ハンドルから ClientInfo への非所有の対応表。
/// 接続の寿命はトランスポート層が決め、Registry は参照のみを保持します。
///
/// ## 契約
///
/// - 全ての操作は失敗しない（未登録は `None` で表現する）
/// - `ClientId` はプロセスの寿命の間、単調増加し再利用されない
/// - 全ての変更は単一の排他制御を通して直列化される
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// 接続を登録する
    ///
    /// 既に登録済みであれば既存のレコードをそのまま返す（冪等）。
    /// open 通知より先にメッセージが届いた場合の遅延登録もこの契約で扱う。
    async fn register(&self, connection: ConnectionId, remote_address: RemoteAddress)
    -> ClientInfo;

    /// 接続の登録を解除し、登録されていたレコードを返す
    ///
    /// 未登録の接続に対しては何もせず `None` を返す。
    async fn deregister(&self, connection: ConnectionId) -> Option<ClientInfo>;

    /// 接続のレコードを取得
    async fn lookup(&self, connection: ConnectionId) -> Option<ClientInfo>;

    /// 現在の登録数（プロトコル上の onlineCount）
    async fn size(&self) -> usize;

    /// 登録中の全メンバーのスナップショット（ClientId 昇順）
    ///
    /// 1 回のロックで取得されるため、`len()` はその時点の `size()` と一致する。
    async fn members(&self) -> Vec<Member>;
}
