//! Concurrent fan-out of one query across platform adapters.
//!
//! Each enabled adapter runs on its own task. All tasks share a single
//! deadline measured from the start of the round; a task still running at
//! the deadline is aborted and reported as a timeout, so its late result can
//! never reach a returned page.
//!
//! Adapters are asked for their leading candidates starting at page one,
//! whatever page the caller wants; the merged list is deduplicated, ranked
//! and sliced exactly once. Every page of a query therefore reports the same
//! `total` and walks one consistent ordering.

mod merge;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use thiserror::Error as ThisError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::domain::ports::PlatformAdapter;
use crate::domain::{
    AggregationOutcome, Error, FailureReason, MAX_PAGE_SIZE, Platform, PlatformFailure,
    PlatformSearchResult, SearchQuery, SearchResult,
};

/// Deadline applied when callers do not supply one.
pub const DEFAULT_AGGREGATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Accounts requested per adapter call while collecting merge candidates.
pub const CANDIDATE_BATCH_SIZE: u32 = MAX_PAGE_SIZE;

/// Most candidates collected from one platform in a single round.
///
/// Merged pages past this window come back empty.
pub const MAX_CANDIDATES_PER_PLATFORM: usize = 1_000;

/// What one adapter task fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fetch {
    /// Leading candidates for a merged round.
    Candidates,
    /// Exactly the caller's page, kept in adapter order.
    Page,
}

/// Programmer errors rejected before any adapter is called.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum AggregationError {
    /// The adapter list was empty by construction.
    #[error("aggregation requires at least one platform adapter")]
    NoAdapters,
}

impl From<AggregationError> for Error {
    fn from(value: AggregationError) -> Self {
        Self::internal(value.to_string())
    }
}

/// Stateless orchestrator for aggregation rounds.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use account_search::domain::ports::PlatformAdapter;
/// use account_search::domain::{SearchAggregator, SearchQuery};
///
/// # async fn run(adapters: Vec<Arc<dyn PlatformAdapter>>) {
/// let query = SearchQuery::new("科技", 1, 20).expect("valid query");
/// let (page, outcome) = SearchAggregator::new()
///     .aggregate(&adapters, &query, Duration::from_secs(5))
///     .await
///     .expect("adapters supplied");
/// println!("{} of {} platforms answered", outcome.successful_platforms, adapters.len());
/// # let _ = page;
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchAggregator;

impl SearchAggregator {
    /// Create an aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Search every enabled adapter for `query` within `timeout`.
    ///
    /// Disabled adapters are never invoked and are reported as
    /// `platform-disabled`. Failed or late adapters contribute nothing but
    /// never fail the round.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::NoAdapters`] when `adapters` is empty.
    pub async fn aggregate(
        &self,
        adapters: &[Arc<dyn PlatformAdapter>],
        query: &SearchQuery,
        timeout: Duration,
    ) -> Result<(SearchResult, AggregationOutcome), AggregationError> {
        if adapters.is_empty() {
            return Err(AggregationError::NoAdapters);
        }
        let started = Instant::now();
        let deadline = deadline_after(started, timeout);

        let rounds = adapters
            .iter()
            .map(|adapter| {
                run_adapter(
                    Arc::clone(adapter),
                    query.clone(),
                    Fetch::Candidates,
                    deadline,
                    timeout,
                )
            });
        let results = join_all(rounds).await;

        let mut outcome = AggregationOutcome::default();
        for result in &results {
            if result.is_success() {
                outcome.successful_platforms += 1;
            } else {
                outcome.failed_platforms.push(failure_of(result));
            }
        }

        let page = merge::merge_results(&results, query);
        let elapsed_ms = elapsed_millis(started);
        let result = SearchResult {
            accounts: page.accounts,
            total: page.total,
            has_more: query.has_more(page.total),
            ..SearchResult::empty(query)
        }
        .with_search_time_ms(elapsed_ms);

        info!(
            keyword = %query.keyword(),
            successful = outcome.successful_platforms,
            failed = outcome.failed_platforms.len(),
            total = result.total,
            elapsed_ms,
            "aggregation round finished"
        );
        Ok((result, outcome))
    }

    /// Search a single adapter within `timeout`, keeping its own ordering.
    ///
    /// A disabled adapter yields a `platform-disabled` failure without being
    /// invoked.
    pub async fn search_one(
        &self,
        adapter: Arc<dyn PlatformAdapter>,
        query: &SearchQuery,
        timeout: Duration,
    ) -> PlatformSearchResult {
        let deadline = deadline_after(Instant::now(), timeout);
        run_adapter(adapter, query.clone(), Fetch::Page, deadline, timeout).await
    }
}

async fn run_adapter(
    adapter: Arc<dyn PlatformAdapter>,
    query: SearchQuery,
    fetch: Fetch,
    deadline: Instant,
    timeout: Duration,
) -> PlatformSearchResult {
    let platform = adapter.platform_id();
    if !adapter.is_enabled() {
        debug!(%platform, "skipping disabled adapter");
        return PlatformSearchResult::failed(
            platform,
            FailureReason::PlatformDisabled,
            format!("{} is disabled", adapter.display_name()),
        );
    }

    let handle: JoinHandle<PlatformSearchResult> = tokio::spawn(async move {
        match fetch {
            Fetch::Candidates => collect_candidates(&*adapter, query.keyword()).await,
            Fetch::Page => {
                adapter
                    .search_accounts(query.keyword(), query.page(), query.page_size())
                    .await
            }
        }
    });
    settle(platform, handle, deadline, timeout).await
}

/// Walk `adapter` from page one until it runs dry or the per-platform window
/// is full.
///
/// Any failed batch fails the whole platform; partial candidate lists are
/// never merged.
async fn collect_candidates(adapter: &dyn PlatformAdapter, keyword: &str) -> PlatformSearchResult {
    let platform = adapter.platform_id();
    let batch_len = usize::try_from(CANDIDATE_BATCH_SIZE).unwrap_or(usize::MAX);
    let mut accounts = Vec::new();
    let mut page = 1;
    let reported_total = loop {
        let batch = adapter
            .search_accounts(keyword, page, CANDIDATE_BATCH_SIZE)
            .await;
        if !batch.is_success() || batch.platform() != platform {
            return batch;
        }
        let reported_total = batch.total();
        let fetched = batch.accounts().len();
        accounts.extend(batch.into_accounts());

        let collected = u64::try_from(accounts.len()).unwrap_or(u64::MAX);
        if fetched < batch_len
            || collected >= reported_total
            || accounts.len() >= MAX_CANDIDATES_PER_PLATFORM
        {
            break reported_total;
        }
        page += 1;
    };
    if accounts.len() > MAX_CANDIDATES_PER_PLATFORM {
        debug!(%platform, reported_total, "candidate window full");
        accounts.truncate(MAX_CANDIDATES_PER_PLATFORM);
    }
    let total = reported_total.max(u64::try_from(accounts.len()).unwrap_or(u64::MAX));
    PlatformSearchResult::succeeded(platform, accounts, total)
}

async fn settle(
    platform: Platform,
    mut handle: JoinHandle<PlatformSearchResult>,
    deadline: Instant,
    timeout: Duration,
) -> PlatformSearchResult {
    match timeout_at(deadline, &mut handle).await {
        Ok(Ok(result)) if result.platform() == platform => result,
        Ok(Ok(result)) => {
            warn!(
                %platform,
                reported = %result.platform(),
                "adapter answered for a different platform"
            );
            PlatformSearchResult::failed(
                platform,
                FailureReason::PlatformApiError,
                format!("adapter reported results for {}", result.platform()),
            )
        }
        Ok(Err(join_error)) => PlatformSearchResult::failed(
            platform,
            FailureReason::PlatformApiError,
            format!("adapter task failed: {join_error}"),
        ),
        Err(_) => {
            handle.abort();
            PlatformSearchResult::failed(
                platform,
                FailureReason::Timeout,
                format!("no response within {} ms", timeout.as_millis()),
            )
        }
    }
}

fn failure_of(result: &PlatformSearchResult) -> PlatformFailure {
    let reason = result
        .failure_reason()
        .unwrap_or(FailureReason::PlatformApiError);
    let message = result.error_message().unwrap_or_default().to_owned();
    warn!(
        platform = %result.platform(),
        %reason,
        error = %message,
        "platform contributed no results"
    );
    PlatformFailure {
        platform: result.platform(),
        reason,
        message,
    }
}

fn deadline_after(start: Instant, timeout: Duration) -> Instant {
    start
        .checked_add(timeout)
        .unwrap_or_else(|| start + DEFAULT_AGGREGATE_TIMEOUT)
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
