//! Rolodex Storage - Store Trait and In-Memory Implementation
//!
//! Defines the storage abstraction for contact records. The PostgreSQL
//! implementation lives in rolodex-api next to its connection pool.

pub mod memory;
pub mod store;

pub use memory::InMemoryContactStore;
pub use store::{ContactStore, LockAttempt, SharedStore};
