//! Persistence layer — injected key-value store for session credentials
//! and local progress markers.

pub mod kv;
pub mod libsql_backend;
pub mod memory;
pub mod migrations;

pub use kv::KvStore;
pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;
