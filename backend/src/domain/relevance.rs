//! Keyword relevance scoring for merged accounts.
//!
//! Weights are chosen so that the text-match tiers never overlap:
//!
//! | signal                        | weight           |
//! |-------------------------------|------------------|
//! | exact name match              | 100              |
//! | name contains keyword         | 50               |
//! | description contains keyword  | 10               |
//! | followers (log10 scale)       | up to 10         |
//! | verified                      | 5                |
//!
//! The best substring match scores at most 75 and the best non-match at most
//! 25, so popularity can reorder accounts within a tier but never across one.
//! Unmatched accounts score zero or more; the aggregator reorders, it does not
//! filter.

use super::{Account, normalize_name};

/// Score for a name equal to the keyword, ignoring case and spacing.
pub const EXACT_NAME_SCORE: f64 = 100.0;
/// Score for a name containing the keyword.
pub const NAME_CONTAINS_SCORE: f64 = 50.0;
/// Bonus for a description containing the keyword.
pub const DESCRIPTION_CONTAINS_SCORE: f64 = 10.0;
/// Cap on the follower bonus.
pub const MAX_FOLLOWER_SCORE: f64 = 10.0;
/// Follower bonus per decade of followers.
pub const FOLLOWER_SCORE_PER_DECADE: f64 = 1.5;
/// Bonus for verified accounts.
pub const VERIFIED_SCORE: f64 = 5.0;

/// Relevance of `account` to `keyword`; always `>= 0`.
///
/// # Examples
/// ```
/// use account_search::domain::{Account, Platform, relevance_score};
/// use chrono::Utc;
///
/// let exact = Account::new(Platform::Weibo, "1", "Rust", Utc::now());
/// let partial = Account::new(Platform::Weibo, "2", "Rust Daily", Utc::now());
/// assert!(relevance_score(&exact, "rust") > relevance_score(&partial, "rust"));
/// ```
pub fn relevance_score(account: &Account, keyword: &str) -> f64 {
    let needle = normalize_name(keyword);
    let mut score = name_score(&normalize_name(&account.name), &needle);

    if !needle.is_empty() && normalize_name(&account.description).contains(&needle) {
        score += DESCRIPTION_CONTAINS_SCORE;
    }
    score += follower_score(account.follower_count);
    if account.is_verified() {
        score += VERIFIED_SCORE;
    }
    score
}

fn name_score(name: &str, needle: &str) -> f64 {
    if needle.is_empty() {
        0.0
    } else if name == needle {
        EXACT_NAME_SCORE
    } else if name.contains(needle) {
        NAME_CONTAINS_SCORE
    } else {
        0.0
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "follower counts beyond 2^53 only need log-scale precision"
)]
fn follower_score(follower_count: u64) -> f64 {
    let decades = (follower_count as f64 + 1.0).log10();
    (decades * FOLLOWER_SCORE_PER_DECADE).min(MAX_FOLLOWER_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Platform;
    use chrono::Utc;
    use rstest::rstest;

    fn named(name: &str) -> Account {
        Account::new(Platform::Weibo, name, name, Utc::now())
    }

    #[rstest]
    fn exact_beats_substring_beats_popular_non_match() {
        let exact = named("测试");
        let substring = named("测试工程师");
        let popular = named("旅行日记").with_follower_count(50_000_000);

        let exact_score = relevance_score(&exact, "测试");
        let substring_score = relevance_score(&substring, "测试");
        let popular_score = relevance_score(&popular, "测试");

        assert!(exact_score > substring_score);
        assert!(substring_score > popular_score);
        assert!(popular_score >= 0.0);
    }

    #[rstest]
    fn boosted_substring_never_reaches_bare_exact_match() {
        let exact = named("rust");
        let boosted = named("rust weekly")
            .with_description("all about rust")
            .with_follower_count(u64::MAX)
            .with_verified(true);

        assert!(relevance_score(&exact, "rust") > relevance_score(&boosted, "rust"));
    }

    #[rstest]
    fn boosted_non_match_never_reaches_bare_substring_match() {
        let substring = named("rustacean");
        let boosted = named("gopher")
            .with_description("sometimes writes rust")
            .with_follower_count(u64::MAX)
            .with_verified(true);

        assert!(relevance_score(&substring, "rust") > relevance_score(&boosted, "rust"));
    }

    #[rstest]
    fn unmatched_unverified_account_without_followers_scores_zero() {
        let score = relevance_score(&named("gopher"), "rust");
        assert!(score.abs() < f64::EPSILON, "expected 0, got {score}");
    }

    #[rstest]
    fn name_matching_ignores_case_and_spacing() {
        let score = relevance_score(&named("  Rust   Lang "), "rust lang");
        assert!((score - EXACT_NAME_SCORE).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(9, 1.5)]
    #[case(99, 3.0)]
    fn follower_bonus_grows_per_decade(#[case] followers: u64, #[case] expected: f64) {
        assert!((follower_score(followers) - expected).abs() < 1e-9);
    }

    #[rstest]
    fn follower_bonus_is_capped() {
        assert!((follower_score(u64::MAX) - MAX_FOLLOWER_SCORE).abs() < f64::EPSILON);
    }

    #[rstest]
    fn verified_and_description_bonuses_apply() {
        let plain = named("gopher");
        let described = named("gopher").with_description("Writes RUST");
        let verified = named("gopher").with_verified(true);

        assert!(
            (relevance_score(&described, "rust") - DESCRIPTION_CONTAINS_SCORE).abs()
                < f64::EPSILON
        );
        assert!((relevance_score(&verified, "rust") - VERIFIED_SCORE).abs() < f64::EPSILON);
        assert!(relevance_score(&plain, "rust") < relevance_score(&verified, "rust"));
    }

    #[rstest]
    fn description_match_ignores_spacing() {
        let described = named("gopher").with_description("notes on Rust \n  Daily life");
        assert!(
            (relevance_score(&described, "rust  daily") - DESCRIPTION_CONTAINS_SCORE).abs()
                < f64::EPSILON
        );
    }
}
