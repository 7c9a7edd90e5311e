//! Database repositories
//!
//! `file_data` holds one row per upload, `users` holds accounts and their
//! current API token.

mod files;
mod users;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub use files::FileRecordRepository;
pub use users::UserRepository;
