//! # egfs-core
//!
//! Core library for egfs - an encrypted, versioned document store kept in a
//! git repository.
//!
//! Every document lives on its own branch (named by the SHA-256 of the
//! document name) as an append-only series of sealed entry files. A sealed
//! table of contents on the primary branch lists the documents. Everything
//! written to the repository is encrypted with a key derived from a single
//! password.

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod fs;
pub mod index;
pub mod log;
pub mod models;
pub mod naming;
pub mod store;

pub use backend::{Backend, GitBackend, MemoryBackend};
pub use config::Config;
pub use error::{Error, Result};
pub use fs::{FileHandle, FileStat};
pub use index::DocumentIndex;
pub use models::{Document, Entry, ReconcileReport};
pub use store::Store;
