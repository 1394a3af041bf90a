use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use ord_scraper::{
    write_results, FetchConfig, OrdSchema, OrdScraper, PollConfig, ScrapeConfig, ScrapeOptions,
    DEFAULT_API_BASE, DEFAULT_USER_AGENT,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Scraper for the Open Reaction Database (ORD) API.
///
/// Examples:
///   ord-scraper --max-datasets 3 --limit 10
///   ord-scraper --dataset-ids ord_dataset-3b7692e9d29b43179261358b13997fef --limit 0
#[derive(Debug, Parser)]
#[command(name = "ord-scraper", version)]
struct Cli {
    /// Maximum number of datasets to scrape. Use 0 for ALL.
    #[arg(long, default_value_t = 2)]
    max_datasets: usize,

    /// Number of reactions per dataset. Use 0 for ALL reactions in a dataset.
    #[arg(long = "limit", default_value_t = 5)]
    per_dataset_limit: u64,

    /// Comma-separated list of specific dataset IDs to scrape.
    #[arg(long)]
    dataset_ids: Option<String>,

    /// Output JSON file path.
    #[arg(long, default_value = "ord_scrape_results.json")]
    json_out: PathBuf,

    /// Base URL of the reaction database API.
    #[arg(long, env = "ORD_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Give up on a query result after this many seconds.
    #[arg(long, default_value_t = 90)]
    poll_timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

fn parse_dataset_ids(raw: Option<&str>) -> Option<Vec<String>> {
    let ids: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    (!ids.is_empty()).then_some(ids)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run(Cli::parse()).await {
        error!("CRITICAL FAILURE: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let dataset_ids = parse_dataset_ids(cli.dataset_ids.as_deref());

    if cli.max_datasets == 0 && dataset_ids.is_none() {
        warn!("You requested ALL datasets. This will take a long time.");
    }
    let max_datasets = (cli.max_datasets > 0).then_some(cli.max_datasets);

    info!("Starting ORD scraper");
    info!(
        "Datasets to process: {}",
        max_datasets.map_or_else(|| "ALL".to_string(), |n| n.to_string())
    );
    info!(
        "Reactions/Dataset: {}",
        if cli.per_dataset_limit > 0 { cli.per_dataset_limit.to_string() } else { "ALL".to_string() }
    );
    info!("Output File: {}", cli.json_out.display());

    let config = ScrapeConfig {
        fetch: FetchConfig {
            api_base: cli.api_base,
            user_agent: cli.user_agent,
            ..FetchConfig::default()
        },
        poll: PollConfig {
            poll_timeout_ms: cli.poll_timeout_secs.saturating_mul(1_000),
            ..PollConfig::default()
        },
        ..ScrapeConfig::default()
    };
    let options = ScrapeOptions {
        max_datasets,
        per_dataset_limit: cli.per_dataset_limit,
        dataset_ids,
    };

    let started = Utc::now();
    let scraper = OrdScraper::new(config, Arc::new(OrdSchema)).context("failed to build scraper")?;
    let records = scraper.run(&options).await.context("scrape aborted")?;

    write_results(&cli.json_out, &records)
        .with_context(|| format!("failed to write {}", cli.json_out.display()))?;

    let failures = records.iter().filter(|r| r.is_error()).count();
    let elapsed = Utc::now().signed_duration_since(started);
    info!(
        "Scrape complete in {}s. Total records: {} ({} errors)",
        elapsed.num_seconds(),
        records.len(),
        failures
    );
    info!("File saved to: {}", cli.json_out.display());
    Ok(())
}
