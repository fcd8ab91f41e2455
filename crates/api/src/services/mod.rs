//! Business logic services.
//!
//! # Services
//!
//! - `password` - Argon2id password hashing
//! - `token` - Signed, time-limited bearer tokens
//! - `auth` - Registration, login, and bearer-token resolution

pub mod auth;
pub mod password;
pub mod token;
