//! Infrastructure 層
//!
//! ドメイン層の trait の具体的な実装と、ワイヤーフォーマット（Envelope）を提供します。

pub mod codec;
pub mod dto;
pub mod message_pusher;
pub mod repository;
