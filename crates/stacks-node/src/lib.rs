//! Stacks Node Library
//!
//! Wires the store, reputation, and search crates into the services a
//! library node runs, plus configuration and demo data.

pub mod accounts;
pub mod config;
pub mod library;
pub mod node;
pub mod seed;

pub use node::Node;
