//! Cache Module
//!
//! Provides an in-memory read-through cache with TTL expiration and
//! epoch-based bulk invalidation.

mod entry;
mod epoch;
pub mod keys;
mod read_through;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use epoch::Epoch;
pub use read_through::ReadThroughCache;
pub use stats::CacheStats;
