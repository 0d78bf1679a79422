//! UseCase 層
//!
//! 接続のライフサイクル（接続・受信・切断・シャットダウン）ごとに、
//! 必要なエンベロープを決められた順序で送り出します。

mod broadcast;
mod connect_client;
mod disconnect_client;
mod get_server_status;
mod membership_gate;
mod relay_message;
mod shutdown_server;

#[cfg(test)]
mod test_support;

pub use broadcast::{BroadcastOutcome, Broadcaster};
pub use connect_client::{ConnectClientUseCase, Connected};
pub use disconnect_client::DisconnectClientUseCase;
pub use get_server_status::GetServerStatusUseCase;
pub use membership_gate::{GatePass, MembershipGate};
pub use relay_message::{RelayMessageUseCase, RelayOutcome};
pub use shutdown_server::ShutdownServerUseCase;

use crate::infrastructure::{codec, dto::envelope::Envelope};

/// エンベロープをワイヤー形式に変換する（失敗はログに残して `None`）
fn encode_envelope(envelope: &Envelope) -> Option<String> {
    match codec::encode(envelope) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::error!("Failed to encode envelope {:?}: {}", envelope, e);
            None
        }
    }
}
