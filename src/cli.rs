//! Command-line interface parsing
//!
//! This module handles parsing of CLI arguments using clap: the city and
//! region to search around, the categories to fetch, and the cache flags.

use std::path::PathBuf;

use clap::Parser;

/// Categories fetched when none are requested explicitly
pub const DEFAULT_CATEGORIES: [&str; 3] = ["restaurants", "hotels", "attractions"];

/// citypoi - look up restaurants, hotels, and attractions near a city
#[derive(Parser, Debug)]
#[command(name = "citypoi")]
#[command(about = "Look up restaurants, hotels, and attractions near a city")]
#[command(version)]
pub struct Cli {
    /// City to search around (e.g. "Seattle")
    pub city: String,

    /// Region qualifier for the geocoding query (e.g. "WA")
    #[arg(long)]
    pub region: Option<String>,

    /// Category to fetch; repeat the flag for several
    ///
    /// Defaults to restaurants, hotels, and attractions when omitted.
    #[arg(long = "category", value_name = "CATEGORY")]
    pub category: Vec<String>,

    /// Serve everything from the local cache; never call the content API
    #[arg(long)]
    pub cache_only: bool,

    /// Cache directory override (defaults to the user cache dir)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Print records as JSON, one object per line
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Categories to fetch, falling back to the default set
    pub fn categories(&self) -> Vec<String> {
        if self.category.is_empty() {
            DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
        } else {
            self.category.clone()
        }
    }
}
