//! HTTP server for the tourney bracket engine.
//!
//! The binary in `main.rs` wires configuration, storage and the router
//! together; everything it needs lives here so integration tests can build
//! the same router against an in-memory store.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod webhook;
