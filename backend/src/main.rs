//! `account-search` command-line entry point.
//!
//! Loads settings, wires adapters and the cache, runs one operation and
//! prints its result as JSON.

mod cli;
mod wiring;

use std::ffi::OsString;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use account_search::config::SearchSettings;
use account_search::domain::SearchService;
use account_search::domain::ports::CacheNamespace;
use cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = SearchSettings::load_from_iter([OsString::from("account-search")])
        .map_err(|error| eyre!("failed to load settings: {error}"))?;
    let service = wiring::build_service(&settings, args.demo).await?;
    run(&service, args.command).await
}

async fn run(service: &SearchService, command: Command) -> Result<()> {
    match command {
        Command::Search {
            keyword,
            platforms,
            paging,
            outcome,
        } => {
            let selected = (!platforms.is_empty()).then_some(platforms.as_slice());
            let (result, round) = service
                .search_accounts_with_outcome(&keyword, selected, paging.page, paging.page_size)
                .await?;
            if outcome {
                print_json(&json!({ "result": result, "outcome": round }))
            } else {
                print_json(&result)
            }
        }
        Command::Platform {
            platform,
            keyword,
            paging,
        } => {
            let result = service
                .search_by_platform(&keyword, &platform, paging.page, paging.page_size)
                .await?;
            print_json(&result)
        }
        Command::Lookup {
            platform,
            account_id,
        } => {
            let account = service
                .get_account_by_platform_id(&platform, &account_id)
                .await?;
            print_json(&account)
        }
        Command::Platforms => print_json(&service.get_supported_platforms()),
        Command::Status { platform } => {
            let available = service.platform_status(&platform).await;
            print_json(&json!({ "platform": platform, "available": available }))
        }
        Command::Stats => print_json(&service.cache_stats().await),
        Command::ClearCache { namespace } => {
            let namespace = namespace
                .as_deref()
                .map(str::parse::<CacheNamespace>)
                .transpose()?;
            let removed = service.clear_cache(namespace).await;
            print_json(&json!({ "removed": removed }))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).wrap_err("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
