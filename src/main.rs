//! citypoi - look up points of interest near a city
//!
//! Geocodes the city, queries the content API for nearby locations in each
//! requested category, and prints one flattened record per location.
//! Raw responses are cached on disk so repeated lookups avoid redundant
//! network calls, and `--cache-only` runs entirely from previous fetches.

mod aggregator;
mod cache;
mod cli;
mod data;
mod transport;

use std::sync::Arc;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use aggregator::Aggregator;
use cache::CacheStore;
use cli::Cli;
use data::{GeocodeClient, LocationClient, LocationRecord, NearbyClient};
use transport::HttpTransport;

/// Environment variable holding the content API key
const API_KEY_VAR: &str = "CITYPOI_API_KEY";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_records(records: &[LocationRecord], json: bool) {
    for record in records {
        if json {
            match serde_json::to_string(record) {
                Ok(line) => println!("{line}"),
                Err(err) => warn!("could not serialize record: {err}"),
            }
        } else {
            println!(
                "[{}] {} | {} | {} | {}",
                record.category, record.name, record.address, record.url, record.photo
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    // The key is read once here and injected into the clients; fetchers
    // never consult the environment themselves.
    let api_key = std::env::var(API_KEY_VAR).unwrap_or_default();
    if api_key.is_empty() && !cli.cache_only {
        warn!("{API_KEY_VAR} is not set; live content API calls will be rejected upstream");
    }

    let cache = match &cli.cache_dir {
        Some(dir) => CacheStore::with_root(dir.clone()),
        None => CacheStore::new()
            .ok_or("could not determine a cache directory; pass --cache-dir")?,
    };

    let transport = Arc::new(HttpTransport::new());
    let aggregator = Aggregator::new(
        GeocodeClient::new(transport.clone()),
        NearbyClient::new(transport.clone(), cache.clone(), api_key.clone()),
        LocationClient::new(transport, cache.clone(), api_key),
        cache,
    );

    let mut records = Vec::new();
    for category in cli.categories() {
        let mut batch = aggregator
            .fetch_category_data(&cli.city, cli.region.as_deref(), &category, cli.cache_only)
            .await;
        records.append(&mut batch);
    }

    print_records(&records, cli.json);
    Ok(())
}
