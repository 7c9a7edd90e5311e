//! Sharehost persistence
//!
//! Postgres repositories implementing the core store traits, plus in-memory
//! equivalents behind the `memory` feature.

pub mod db;

pub use db::{FileRecordRepository, UserRepository};

#[cfg(any(test, feature = "memory"))]
pub use db::memory::{InMemoryRecordStore, InMemoryUserStore};
