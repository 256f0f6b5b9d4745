use tracing::{info, instrument, warn};

use crate::{
    cache::CacheStore,
    config::{Config, DiscoveryConfig},
    discovery::{
        HostMatcher, ct_log::query_ct_log, heuristic::brute_force_candidates,
        page_scrape::scrape_provider_pages,
    },
    fanout::first_success,
    http::Fetch,
    resolver::{Resolved, Source},
    validator::validate_host,
};

/// Finds a stream mirror that serves the relay files.
///
/// Tiers, first hit wins: a fresh cache entry, CT-log names, hosts scraped
/// from provider pages, the brute-force host space, then the configured
/// default. Anything but a cache hit is written back to the cache with `now`,
/// including the default.
#[instrument(skip_all)]
pub async fn find_base_stream_url(
    client: &impl Fetch,
    config: &Config,
    cache: &CacheStore,
    now: f64,
) -> Resolved {
    let mut record = cache.load().await;
    if let Some(url) = record.fresh_base_url(now, config.cache_ttl()) {
        info!("Stream mirror: using cached {url}");
        return Resolved::new(url, Source::Cache);
    }

    let resolved = match discover(client, config).await {
        Some(resolved) => {
            info!("Stream mirror: found {} via {}", resolved.url, resolved.source);
            resolved
        }
        None => {
            warn!(
                "Stream mirror: nothing validated, falling back to {}",
                config.discovery.default_base_url
            );
            Resolved::new(&config.discovery.default_base_url, Source::Default)
        }
    };

    record.set_base_url(&resolved.url, now);
    cache.save(&record).await;
    resolved
}

async fn discover(client: &impl Fetch, config: &Config) -> Option<Resolved> {
    let discovery = &config.discovery;
    let matcher = match HostMatcher::from_config(discovery) {
        Ok(m) => m,
        Err(e) => {
            warn!("Skipping discovery: {e:#}");
            return None;
        }
    };

    let hosts = query_ct_log(
        client,
        &discovery.ct_log_url,
        &matcher,
        discovery.ct_log_timeout(),
    )
    .await;
    if let Some(url) = validate_all(client, discovery, hosts, discovery.validation_width).await {
        return Some(Resolved::new(url, Source::CtLog));
    }
    info!("CT-log gave no working mirror, scraping provider pages");

    let hosts =
        scrape_provider_pages(client, &config.provider, &discovery.page_scrape, &matcher).await;
    if let Some(url) = validate_all(client, discovery, hosts, discovery.validation_width).await {
        return Some(Resolved::new(url, Source::PageScrape));
    }
    info!("Page scrape gave no working mirror, trying the heuristic host space");

    let hosts = brute_force_candidates(&discovery.heuristic, &matcher);
    let width = Some(discovery.heuristic.chunk_size);
    if let Some(url) = validate_all(client, discovery, hosts, width).await {
        return Some(Resolved::new(url, Source::Heuristic));
    }

    None
}

async fn validate_all(
    client: &impl Fetch,
    discovery: &DiscoveryConfig,
    hosts: Vec<String>,
    width: Option<usize>,
) -> Option<String> {
    let path = discovery.validation_path.as_str();
    let timeout = discovery.validation_timeout();

    first_success(hosts, width, |host| async move {
        validate_host(client, &host, path, timeout).await
    })
    .await
}
