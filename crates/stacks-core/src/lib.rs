//! Stacks Core - Shared types, reputation policy, and storage contracts
//!
//! This crate provides the building blocks of the Stacks academic library:
//! the account and resource model, the pure reputation scoring policy, and
//! the storage traits every service is written against.

pub mod error;
pub mod reputation;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use reputation::{classify, score, throttle_multiplier, Tier};
pub use store::{AccountStore, RatingStore, ResourceStore};
pub use types::*;
