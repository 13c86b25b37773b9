//! Stacks Index - Catalogue search and reputation aggregation
//!
//! Both services are stateless views over a `stacks-core` store: the
//! [`SearchIndex`] ranks and pages resources, the [`ReputationService`]
//! keeps account tiers current and reports on the network.

pub mod aggregator;
pub mod search;

pub use aggregator::{NetworkStats, Outcome, RecalculationReport, ReputationInfo, ReputationService};
pub use search::{SearchFilters, SearchIndex, SortKey, SortOrder};
