//! Domain primitives, ports and services for account search.
//!
//! Purpose: define the account, query and result types exchanged with
//! platform adapters, the ports those adapters implement, and the services
//! that fan searches out, merge them and cache the outcome.
//!
//! Public surface:
//! - `Account`, `Platform`: canonical listing and its hosting platform.
//! - `SearchQuery`: validated keyword and paging.
//! - `PlatformSearchResult`, `SearchResult`, `AggregationOutcome`: results.
//! - `SearchAggregator`: concurrent fan-out with a shared deadline.
//! - `ResultCache`: best-effort tiered cache over a `CacheStore` port.
//! - `SearchService`: the query operations exposed to callers.

pub mod account;
pub mod aggregator;
pub mod content_hash;
pub mod error;
pub mod platform;
pub mod ports;
pub mod relevance;
pub mod result_cache;
pub mod search_query;
pub mod search_result;
pub mod search_service;

pub use self::account::{Account, VERIFIED_DETAIL_KEY, normalize_name};
pub use self::aggregator::{
    AggregationError, CANDIDATE_BATCH_SIZE, DEFAULT_AGGREGATE_TIMEOUT,
    MAX_CANDIDATES_PER_PLATFORM, SearchAggregator,
};
pub use self::content_hash::{
    ContentHash, ContentHashError, SHORT_HASH_BYTES, canonicalize_and_hash,
};
pub use self::error::{Error, ErrorCode};
pub use self::platform::{Platform, UnknownPlatformError};
pub use self::relevance::relevance_score;
pub use self::result_cache::{
    CacheKeyBuilder, CacheKeyError, CacheStats, CacheTtls, DEFAULT_KEY_PREFIX, ResultCache,
};
pub use self::search_query::{
    MAX_KEYWORD_CHARS, MAX_PAGE_SIZE, SearchQuery, SearchQueryValidationError,
};
pub use self::search_result::{
    AggregationOutcome, FailureReason, PlatformFailure, PlatformSearchResult, SearchResult,
};
pub use self::search_service::{
    AdapterRegistry, DEFAULT_LOOKUP_TIMEOUT, RegistryError, SearchService, SearchServiceConfig,
};
