//! Atelier Core - Shared domain types.
//!
//! This crate provides the validated value types used by the catalog service:
//! - `api` - HTTP service (registration, tokens, item CRUD)
//! - `cli` - Command-line tools for schema management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Database encoding is available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, usernames, emails, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
