//! ドメイン層
//!
//! リレーの値オブジェクト・エンティティと、外部依存への境界（trait）を定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ClientInfo, Member};
pub use error::MessagePushError;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::ClientRegistry;
pub use value_object::{ClientId, ConnectionId, ConnectionIdFactory, RemoteAddress, Timestamp};
