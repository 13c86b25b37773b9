//! Stacks Store - In-memory storage backend
//!
//! Implements the `stacks-core` storage traits over hash maps guarded by a
//! single read/write lock. Nothing is persisted.

pub mod storage;

pub use storage::MemoryStore;
