//! Shared utilities for Hatake binaries and tests.

pub mod logger;
pub mod time;
