//! Command-line surface of the `account-search` binary.

use clap::{Parser, Subcommand};

/// `account-search` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "account-search",
    about = "Search creator accounts across content platforms",
    version
)]
pub(crate) struct CliArgs {
    /// Register built-in demo adapters for platforms without an endpoint.
    #[arg(long, global = true)]
    pub(crate) demo: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Operation to run.
#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Command {
    /// Search all (or selected) platforms and merge the results.
    Search {
        /// Keyword to search for.
        keyword: String,
        /// Restrict to these platform ids; repeat for several.
        #[arg(long = "platform", value_name = "id")]
        platforms: Vec<String>,
        #[command(flatten)]
        paging: Paging,
        /// Include per-platform outcome alongside the result.
        #[arg(long)]
        outcome: bool,
    },
    /// Search a single platform.
    Platform {
        /// Platform id, for example `weibo`.
        platform: String,
        /// Keyword to search for.
        keyword: String,
        #[command(flatten)]
        paging: Paging,
    },
    /// Look up one account by its platform-native id.
    Lookup {
        /// Platform id.
        platform: String,
        /// Platform-native account id.
        account_id: String,
    },
    /// List enabled platforms in registration order.
    Platforms,
    /// Check whether a platform is reachable.
    Status {
        /// Platform id.
        platform: String,
    },
    /// Print per-namespace cache entry counts.
    Stats,
    /// Drop cached entries.
    ClearCache {
        /// Namespace to clear (`aggregate`, `platform`, `account`,
        /// `platform-status`); all when omitted.
        #[arg(long, value_name = "name")]
        namespace: Option<String>,
    },
}

/// Page selection shared by search commands.
#[derive(Debug, Clone, Copy, clap::Args)]
pub(crate) struct Paging {
    /// One-based page number.
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
    /// Accounts per page.
    #[arg(long = "page-size", default_value_t = 20)]
    pub(crate) page_size: u32,
}
