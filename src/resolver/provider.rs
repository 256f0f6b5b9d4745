use tracing::{debug, info, instrument, warn};

use crate::{
    config::ProviderConfig,
    fanout::first_success,
    http::Fetch,
    resolver::{Resolved, Source},
};

/// Finds the lowest-numbered provider domain that is up and links streams.
///
/// Not cached: the provider only serves as the referrer.
#[instrument(skip_all, fields(start = config.range.start, end = config.range.end))]
pub async fn find_working_provider(client: &impl Fetch, config: &ProviderConfig) -> Resolved {
    let found = first_success(config.range.iter(), Some(config.probe_width), |n| {
        probe_provider(client, config, n)
    })
    .await;

    if let Some(url) = found {
        info!("Provider: found {url}");
        Resolved::new(url, Source::Probe)
    } else {
        warn!(
            "Provider: nothing answered, falling back to {}",
            config.default_url
        );
        Resolved::new(&config.default_url, Source::Default)
    }
}

async fn probe_provider(client: &impl Fetch, config: &ProviderConfig, n: u32) -> Option<String> {
    let url = config.url_for(n);
    match client.fetch(&url, config.timeout()).await {
        Ok(res) if res.is_ok() && res.body.contains(&config.marker) => Some(url),
        Ok(res) => {
            debug!("{url}: status {} without marker", res.status);
            None
        }
        Err(e) => {
            debug!("{url}: {e:#}");
            None
        }
    }
}
