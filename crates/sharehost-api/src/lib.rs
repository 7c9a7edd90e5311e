//! Sharehost API Library
//!
//! HTTP handlers, authentication and application setup.

mod handlers;
mod pages;
mod services;
mod utils;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
