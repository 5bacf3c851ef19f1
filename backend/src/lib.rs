//! Multi-platform account search.
//!
//! Fans one keyword query out to several content platforms concurrently,
//! bounds the round with a shared deadline, merges and ranks what comes back,
//! and caches results at several granularities.
//!
//! - [`domain`]: types, ports, the aggregator, the result cache and the
//!   search service.
//! - [`outbound`]: cache store and platform adapter implementations.
//! - [`config`]: settings loaded from the environment or config files.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
