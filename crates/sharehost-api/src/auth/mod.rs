//! Token authentication
//!
//! Users log in with a password and receive a long-lived JWT that is also
//! stored on their account. A request is authenticated only when the token
//! verifies *and* matches the stored one, so deleting or rotating the stored
//! token revokes access.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use models::AuthUser;
