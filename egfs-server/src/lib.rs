//! # egfs-server
//!
//! Read-only HTTP file server over an egfs store. Every request is served
//! from freshly decrypted content; writes go through the CLI or the core
//! library.

pub mod api;
pub mod server;

pub use api::{AppState, SharedStore};
pub use server::EgfsServer;
