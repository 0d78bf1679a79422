//! InMemory Client Registry 実装
//!
//! ドメイン層が定義する ClientRegistry trait の具体的な実装。
//!
//! ## データ構造（arena + index）
//!
//! ```text
//! index: ConnectionId -> slot   (受信イベント時の O(1) 検索)
//! slots: [Option<Member>]       (slot で引く密なテーブル、空き slot は再利用)
//! counter                       (ClientId の払い出し、再利用しない)
//! ```
//!
//! slot は再利用されるが ClientId は再利用されない。
//! 全ての状態は 1 つの Mutex の内側にあり、操作は直列化される。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use hatake_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ClientId, ClientInfo, ClientRegistry, ConnectionId, Member, RemoteAddress, Timestamp,
};

#[derive(Debug, Default)]
struct RegistryState {
    slots: Vec<Option<Member>>,
    free_slots: Vec<usize>,
    index: HashMap<ConnectionId, usize>,
    counter: u64,
}

impl RegistryState {
    fn get(&self, connection: ConnectionId) -> Option<&Member> {
        let slot = *self.index.get(&connection)?;
        self.slots.get(slot)?.as_ref()
    }

    fn insert(&mut self, member: Member) {
        let connection = member.connection;
        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.slots[slot] = Some(member);
                slot
            }
            None => {
                self.slots.push(Some(member));
                self.slots.len() - 1
            }
        };
        self.index.insert(connection, slot);
    }

    fn remove(&mut self, connection: ConnectionId) -> Option<Member> {
        let slot = self.index.remove(&connection)?;
        let member = self.slots.get_mut(slot)?.take();
        self.free_slots.push(slot);
        member
    }
}

/// インメモリ Client Registry 実装
///
/// プロセス起動時に 1 度だけ生成し、UseCase 層に `Arc<dyn ClientRegistry>` として渡します。
pub struct InMemoryClientRegistry {
    state: Mutex<RegistryState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryClientRegistry {
    /// 新しい InMemoryClientRegistry を作成
    ///
    /// `clock` は `connectedAt` の打刻に使われる。
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            clock,
        }
    }
}

#[async_trait]
impl ClientRegistry for InMemoryClientRegistry {
    async fn register(
        &self,
        connection: ConnectionId,
        remote_address: RemoteAddress,
    ) -> ClientInfo {
        let mut state = self.state.lock().await;

        if let Some(existing) = state.get(connection) {
            return existing.info.clone();
        }

        state.counter += 1;
        let info = ClientInfo::new(
            ClientId::new(state.counter),
            remote_address,
            Timestamp::new(self.clock.now()),
        );
        state.insert(Member {
            connection,
            info: info.clone(),
        });

        tracing::debug!(
            "Client {} registered for {} (online: {})",
            info.id,
            connection,
            state.index.len()
        );
        info
    }

    async fn deregister(&self, connection: ConnectionId) -> Option<ClientInfo> {
        let mut state = self.state.lock().await;
        let member = state.remove(connection)?;
        tracing::debug!(
            "Client {} deregistered (online: {})",
            member.info.id,
            state.index.len()
        );
        Some(member.info)
    }

    async fn lookup(&self, connection: ConnectionId) -> Option<ClientInfo> {
        let state = self.state.lock().await;
        state.get(connection).map(|member| member.info.clone())
    }

    async fn size(&self) -> usize {
        let state = self.state.lock().await;
        state.index.len()
    }

    async fn members(&self) -> Vec<Member> {
        let state = self.state.lock().await;
        let mut members: Vec<Member> = state.slots.iter().flatten().cloned().collect();
        members.sort_by_key(|member| member.info.id);
        members
    }
}
