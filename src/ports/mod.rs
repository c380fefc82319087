//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `DistributionCache` - Shared read-through, write-once cache of
//!   evaluated subtrees

mod distribution_cache;

pub use distribution_cache::DistributionCache;
