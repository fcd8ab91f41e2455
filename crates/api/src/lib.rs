//! Atelier catalog API library.
//!
//! Registration, bearer-token login and authenticated CRUD over the catalog
//! of fashion items. The `atelier-api` binary serves [`routes::app`]; the
//! library form lets the CLI reuse the schema setup and lets tests drive the
//! router in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
