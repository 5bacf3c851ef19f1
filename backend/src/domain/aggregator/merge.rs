//! Merge, dedup, ranking and pagination of successful platform pages.
//!
//! 1. Concatenate accounts in adapter registration order
//! 2. Collapse accounts whose normalised names match, keeping the larger
//!    follower count (ties keep the first seen)
//! 3. Score against the keyword and sort into a strict total order
//! 4. Slice out the requested page

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::trace;

use crate::domain::{Account, PlatformSearchResult, SearchQuery, relevance_score};

/// Deduplicated, ranked candidates for one aggregation round.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RankedPage {
    /// Accounts on the requested page.
    pub accounts: Vec<Account>,
    /// Deduplicated candidate count across all pages.
    pub total: u64,
}

/// Collapse duplicates across `results`, preserving first-seen order.
pub(super) fn dedup_accounts<'a>(
    results: impl IntoIterator<Item = &'a PlatformSearchResult>,
) -> Vec<Account> {
    let mut survivors: Vec<Account> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for account in results
        .into_iter()
        .filter(|result| result.is_success())
        .flat_map(PlatformSearchResult::accounts)
    {
        match index_by_name.entry(account.dedup_key()) {
            Entry::Vacant(slot) => {
                slot.insert(survivors.len());
                survivors.push(account.clone());
            }
            Entry::Occupied(slot) => {
                let Some(kept) = survivors.get_mut(*slot.get()) else {
                    continue;
                };
                if account.follower_count > kept.follower_count {
                    trace!(
                        name = %account.name,
                        replaced = %kept.platform,
                        by = %account.platform,
                        "duplicate account replaced by larger audience"
                    );
                    *kept = account.clone();
                }
            }
        }
    }
    survivors
}

/// Order accounts by descending relevance to `keyword`.
///
/// Ties fall back to follower count (descending), name, platform and
/// platform account id, so the order is total and stable across calls.
pub(super) fn rank_accounts(accounts: Vec<Account>, keyword: &str) -> Vec<Account> {
    let mut scored: Vec<(f64, Account)> = accounts
        .into_iter()
        .map(|account| (relevance_score(&account, keyword), account))
        .collect();
    scored.sort_by(|(left_score, left), (right_score, right)| {
        right_score
            .total_cmp(left_score)
            .then_with(|| compare_accounts(left, right))
    });
    scored.into_iter().map(|(_, account)| account).collect()
}

fn compare_accounts(left: &Account, right: &Account) -> Ordering {
    right
        .follower_count
        .cmp(&left.follower_count)
        .then_with(|| left.name.cmp(&right.name))
        .then_with(|| left.platform.as_str().cmp(right.platform.as_str()))
        .then_with(|| left.platform_account_id.cmp(&right.platform_account_id))
}

/// Slice `[offset, end)` out of `ranked`, clamped to its bounds.
pub(super) fn paginate(ranked: Vec<Account>, query: &SearchQuery) -> RankedPage {
    let total = u64::try_from(ranked.len()).unwrap_or(u64::MAX);
    let start = usize::try_from(query.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(query.page_size()).unwrap_or(usize::MAX);
    let accounts = ranked.into_iter().skip(start).take(take).collect();
    RankedPage { accounts, total }
}

/// Run the full merge pipeline over successful `results`.
pub(super) fn merge_results(results: &[PlatformSearchResult], query: &SearchQuery) -> RankedPage {
    let candidates = dedup_accounts(results);
    let ranked = rank_accounts(candidates, query.keyword());
    paginate(ranked, query)
}
