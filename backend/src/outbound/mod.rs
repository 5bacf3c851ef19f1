//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **cache**: `CacheStore` implementations (in-process map, Redis)
//! - **platform**: `PlatformAdapter` implementations (in-memory, HTTP JSON)
//!
//! Adapters translate between domain types and transport representations.
//! They hold no search policy of their own.

pub mod cache;
pub mod platform;
