//! Cache store adapters.
//!
//! `MemoryCacheStore` serves single-process deployments and tests;
//! `RedisCacheStore` shares entries across instances through a `bb8` pool.

mod memory;
mod redis;

pub use memory::{MemoryCacheStore, SWEEP_EVERY_WRITES};
pub use redis::RedisCacheStore;
