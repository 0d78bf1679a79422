//! 入退室ゲート
//!
//! 接続・切断・シャットダウンによるメンバー構成の変更を 1 つずつ直列化します。
//! 接続処理はゲートを通っている間に登録・welcome・キューの接続・client_joined までを終えるので、
//! その途中に他の接続の入退室が割り込むことはありません。
//!
//! シャットダウンはゲートを閉じてから通知を送るため、閉じた後の接続は受け付けません。

use tokio::sync::{Mutex, MutexGuard};

/// 入退室ゲート
#[derive(Debug)]
pub struct MembershipGate {
    /// true: 新しい接続を受け付ける
    accepting: Mutex<bool>,
}

/// ゲートを通過している間だけ保持するガード
pub type GatePass<'a> = MutexGuard<'a, bool>;

impl MembershipGate {
    pub fn new() -> Self {
        Self {
            accepting: Mutex::new(true),
        }
    }

    /// 入室（接続）のためにゲートを通る
    ///
    /// ゲートが閉じていれば `None` を返す。
    pub async fn admit(&self) -> Option<GatePass<'_>> {
        let pass = self.accepting.lock().await;
        if *pass { Some(pass) } else { None }
    }

    /// 退室（切断）のためにゲートを通る。閉じた後も通れる。
    pub async fn pass(&self) -> GatePass<'_> {
        self.accepting.lock().await
    }

    /// ゲートを閉じる。返したガードを持っている間は他の入退室は進まない。
    pub async fn close(&self) -> GatePass<'_> {
        let mut pass = self.accepting.lock().await;
        *pass = false;
        pass
    }
}

impl Default for MembershipGate {
    fn default() -> Self {
        Self::new()
    }
}
