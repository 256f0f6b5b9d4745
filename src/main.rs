#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![warn(clippy::perf)]
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use mirror_scout::{
    config::Config,
    run,
    util::{init_http_client, warn_ulimit},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Finds working stream mirrors and writes an M3U playlist pointing at them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file overriding the built-in mirror lists, ranges and defaults
    #[arg(short, long, env = "MIRROR_SCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Where the playlist is written [default: output/dengetv54.m3u]
    #[arg(short, long, env = "MIRROR_SCOUT_OUTPUT")]
    output: Option<String>,

    /// Where the resolved stream mirror is cached [default: cache.json]
    #[arg(long, env = "MIRROR_SCOUT_CACHE_FILE")]
    cache_file: Option<String>,

    /// Playlist fragment appended verbatim to the output
    #[arg(long, env = "MIRROR_SCOUT_FRAGMENT_URL")]
    fragment_url: Option<String>,

    /// Ignore the cached stream mirror and run discovery again
    #[arg(short, long)]
    refresh: bool,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(output) = self.output {
            config.playlist.output_path = output;
        }
        if let Some(cache_file) = self.cache_file {
            config.cache_file = cache_file;
        }
        if self.fragment_url.is_some() {
            config.playlist.fragment_url = self.fragment_url;
        }
        if self.refresh {
            config.cache_ttl_secs = 0;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Args::parse().into_config()?;
    warn_ulimit(config.discovery.heuristic.chunk_size);

    let client = init_http_client()?;
    run(&client, &config).await?;

    info!("All done successfully!");
    Ok(())
}
