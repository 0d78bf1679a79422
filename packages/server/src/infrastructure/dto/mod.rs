//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `envelope`: WebSocket envelope DTOs
//! - `http`: HTTP API response DTOs

pub mod envelope;
pub mod http;
