//! Platform adapters.
//!
//! `InMemoryPlatformAdapter` serves fixed data for tests and demos;
//! `HttpPlatformAdapter` talks to a JSON search gateway per platform.

mod dto;
mod http;
mod in_memory;

pub use http::HttpPlatformAdapter;
pub use in_memory::InMemoryPlatformAdapter;
