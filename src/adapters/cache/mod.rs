//! Distribution cache adapters.

mod in_memory;

pub use in_memory::{CacheStats, InMemoryDistributionCache};
