#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![warn(clippy::perf)]
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::missing_panics_doc)]

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::{
    cache::{CacheStore, unix_now},
    config::Config,
    http::Fetch,
    playlist::{assemble, fetch_fragment, write_playlist},
    resolver::{find_base_stream_url, find_working_provider},
};

pub mod cache;
pub mod config;
pub mod discovery;
pub mod fanout;
pub mod http;
pub mod playlist;
pub mod resolver;
pub mod util;
pub mod validator;

/// Resolves both mirrors, assembles the playlist and writes it to the
/// configured output path. Returns the written text.
///
/// # Errors
/// Only fails when the playlist cannot be written. Discovery problems fall
/// back to the configured defaults.
pub async fn run(client: &impl Fetch, config: &Config) -> Result<String> {
    let cache = CacheStore::new(&config.cache_file);
    let base = find_base_stream_url(client, config, &cache, unix_now()).await;
    let provider = find_working_provider(client, &config.provider).await;

    let fragment = match &config.playlist.fragment_url {
        Some(url) => fetch_fragment(client, url, config.playlist.fragment_timeout()).await,
        None => None,
    };

    let content = assemble(
        &config.playlist,
        &base.url,
        &provider.url,
        fragment.as_deref(),
    );
    write_playlist(Path::new(&config.playlist.output_path), &content).await?;
    info!("{} - M3U created", Utc::now().to_rfc3339());

    Ok(content)
}
