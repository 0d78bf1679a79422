//! WebSocket relay library.
//!
//! Accepts many concurrent WebSocket peers, assigns each a stable numeric identity and
//! fans out every inbound message to the other connected peers inside a small JSON
//! envelope protocol.

pub mod bootstrap;

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
