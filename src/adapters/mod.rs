//! Adapters - Implementations of port interfaces.
//!
//! - `cache` - Distribution cache implementations (in-memory)

pub mod cache;

pub use cache::{CacheStats, InMemoryDistributionCache};
