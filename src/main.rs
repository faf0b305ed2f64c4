use clap::Parser;
use std::sync::Arc;

use patch_explorer::browse::{BrowseSnapshot, CommitBrowser, DetailLoader, NavOutcome};
use patch_explorer::cli::args::Args;
use patch_explorer::config::Config;
use patch_explorer::dataset::fetch::{DataFetcher, FsFetcher};
use patch_explorer::dataset::session::DatasetSession;
use patch_explorer::engine::sqlite::SqliteBackend;
use patch_explorer::engine::QueryEngine;
use patch_explorer::models::{Commit, Component, PatchKind};
use patch_explorer::query::FilterCriteria;
use patch_explorer::stats;

fn build_criteria(args: &Args) -> anyhow::Result<FilterCriteria> {
    let mut criteria = FilterCriteria::new()
        .keyword(&args.keyword)
        .version(&args.release)
        .file_name(&args.file_name);

    if !args.start_date.is_empty() {
        criteria.start_date = Some(args.start_date.parse().map_err(|_| {
            anyhow::anyhow!("Invalid start date '{}', expected YYYY-MM-DD", args.start_date)
        })?);
    }
    if !args.end_date.is_empty() {
        criteria.end_date = Some(args.end_date.parse().map_err(|_| {
            anyhow::anyhow!("Invalid end date '{}', expected YYYY-MM-DD", args.end_date)
        })?);
    }
    if !args.component.is_empty() {
        criteria.component = Some(
            Component::parse(&args.component)
                .ok_or_else(|| anyhow::anyhow!("Unknown component: {}", args.component))?,
        );
    }
    if !args.patch_type.is_empty() {
        criteria.patch_type = Some(
            PatchKind::parse(&args.patch_type)
                .ok_or_else(|| anyhow::anyhow!("Unknown patch type: {}", args.patch_type))?,
        );
    }

    Ok(criteria)
}

fn build_fetcher(config: &Config) -> anyhow::Result<Arc<dyn DataFetcher>> {
    if let Some(base_url) = &config.data_base_url {
        #[cfg(feature = "http-fetch")]
        {
            let base = url::Url::parse(base_url)?;
            return Ok(Arc::new(patch_explorer::dataset::fetch::HttpFetcher::new(
                base,
            )));
        }
        #[cfg(not(feature = "http-fetch"))]
        anyhow::bail!(
            "dataset URL '{}' configured but the http-fetch feature is disabled",
            base_url
        );
    }
    Ok(Arc::new(FsFetcher::new(&config.data_dir)))
}

fn print_commit(commit: &Commit) {
    let short_id: String = commit.commit_id.chars().take(8).collect();
    println!(
        "{}  {}  {:<12} {}",
        short_id,
        commit.date,
        commit.version,
        commit.summary_line(80)
    );
    println!(
        "          {} | {} | {} files, +{} -{}",
        commit.author, commit.component, commit.files_changed, commit.insertions,
        commit.deletions
    );
    let tags = commit.tag_list();
    if !tags.is_empty() {
        println!("          tags: {}", tags.join(", "));
    }
}

fn print_snapshot(snapshot: &BrowseSnapshot) {
    println!(
        "Search results: {} commits (page {}/{})",
        snapshot.total,
        snapshot.page,
        snapshot.total_pages.max(1)
    );
    println!();
    for commit in &snapshot.rows {
        print_commit(commit);
        println!();
    }
    if snapshot.rows.is_empty() {
        println!("No commits found. Try adjusting the filters.");
    }
}

async fn run_stats(handle: &Arc<dyn QueryEngine>) -> anyhow::Result<()> {
    let series = stats::aggregate(handle).await?;
    println!(
        "{:<10} {:>12} {:>8} {:>6} {:>12} {:>12} {:>7}",
        "version", "performance", "feature", "bug", "maintenance", "reliability", "total"
    );
    for aggregate in &series {
        println!(
            "{:<10} {:>12} {:>8} {:>6} {:>12} {:>12} {:>7}",
            aggregate.version,
            aggregate.performance,
            aggregate.feature,
            aggregate.bug,
            aggregate.maintenance,
            aggregate.reliability,
            aggregate.total
        );
    }
    Ok(())
}

async fn run_expand(loader: &DetailLoader, commit_id: &str) -> anyhow::Result<()> {
    let diffs = loader.load(commit_id).await?;
    println!("File changes for {} ({}):", commit_id, diffs.len());
    for diff in diffs.iter() {
        println!("  {}  +{} -{}", diff.file_path, diff.insertions, diff.deletions);
    }
    if diffs.is_empty() {
        println!("  No file diffs available");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::new();
    config.update_from_args(&args);
    config.validate()?;

    let default_filter = if config.debug {
        "patch_explorer=debug"
    } else {
        "patch_explorer=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let fetcher = build_fetcher(&config)?;
    let session = DatasetSession::new(fetcher, Box::new(SqliteBackend::detect()));
    let handle = session.open().await?;

    if args.stats {
        run_stats(&handle).await?;
        session.close().await;
        return Ok(());
    }

    let browser = CommitBrowser::new(handle.clone());
    let criteria = build_criteria(&args)?;

    if let NavOutcome::Done(snapshot) = browser.search(criteria).await? {
        if args.page > 1 {
            match browser.go_to(args.page).await? {
                NavOutcome::Done(snapshot) => print_snapshot(&snapshot),
                NavOutcome::Rejected => {
                    println!(
                        "Page {} is out of range (1..={})",
                        args.page,
                        snapshot.total_pages.max(1)
                    );
                }
            }
        } else {
            print_snapshot(&snapshot);
        }
    }

    if let Some(commit_id) = &args.expand {
        let loader = DetailLoader::new(handle.clone());
        run_expand(&loader, commit_id).await?;
    }

    session.close().await;
    Ok(())
}
