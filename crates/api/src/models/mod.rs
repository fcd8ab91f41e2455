//! Domain models and request/response schemas.
//!
//! - [`user`] - Registered users and the public projection returned by `/register`
//! - [`item`] - Catalog items, validated create/update fields, and partial updates

pub mod item;
pub mod user;
