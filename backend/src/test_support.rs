//! Test utilities for the account search crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{CacheKey, CacheStore, CacheStoreError};
use crate::domain::{Account, Platform};

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock frozen at the current wall time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("duration out of range for the clock: {error}; delta={delta:?}"),
        };
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex poisoned"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Cache store that fails every call, simulating an unreachable backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCacheStore;

impl FailingCacheStore {
    fn outage() -> CacheStoreError {
        CacheStoreError::backend("cache backend unreachable")
    }
}

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStoreError> {
        Err(Self::outage())
    }

    async fn set(
        &self,
        _key: &CacheKey,
        _payload: Vec<u8>,
        _ttl: Duration,
    ) -> Result<(), CacheStoreError> {
        Err(Self::outage())
    }

    async fn delete(&self, _key: &CacheKey) -> Result<(), CacheStoreError> {
        Err(Self::outage())
    }

    async fn count_prefix(&self, _prefix: &str) -> Result<u64, CacheStoreError> {
        Err(Self::outage())
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<u64, CacheStoreError> {
        Err(Self::outage())
    }
}

/// `count` accounts on `platform` whose names start with `keyword`.
///
/// Follower counts grow with the index so rankings are predictable.
pub fn sample_accounts(platform: Platform, keyword: &str, count: usize) -> Vec<Account> {
    let observed_at = Utc::now();
    (0..count)
        .map(|index| {
            let followers = u64::try_from(index).unwrap_or(u64::MAX).saturating_mul(100);
            Account::new(
                platform,
                format!("{platform}-{index}"),
                format!("{keyword} {platform} {index}"),
                observed_at,
            )
            .with_follower_count(followers)
        })
        .collect()
}
