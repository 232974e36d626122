//! Proof persistence contract and in-memory backend

pub mod adapter;
pub mod memory;

pub use adapter::StorageAdapter;
pub use memory::{MemoryStorage, MemoryStorageFailures};
