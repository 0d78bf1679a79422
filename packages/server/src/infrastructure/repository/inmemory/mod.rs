//! InMemory 実装

mod client_registry;

pub use client_registry::InMemoryClientRegistry;
