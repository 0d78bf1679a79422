//! UseCase: サーバー状態の取得

use std::sync::Arc;

use crate::domain::ClientRegistry;

/// サーバー状態取得のユースケース
pub struct GetServerStatusUseCase {
    registry: Arc<dyn ClientRegistry>,
}

impl GetServerStatusUseCase {
    /// 新しい GetServerStatusUseCase を作成
    pub fn new(registry: Arc<dyn ClientRegistry>) -> Self {
        Self { registry }
    }

    /// 現在の接続数（onlineCount）を返す
    pub async fn execute(&self) -> usize {
        self.registry.size().await
    }
}
