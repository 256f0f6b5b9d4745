use std::collections::BTreeSet;

use tracing::{debug, info, instrument};

use crate::{
    config::{PageScrapeConfig, ProviderConfig},
    discovery::HostMatcher,
    http::Fetch,
};

/// Walks the numbered provider pages in ascending order and collects every
/// mirror hostname they mention.
///
/// `max_pages` is a budget of successfully fetched pages, not of hosts found.
/// Pages that fail to load are skipped.
#[instrument(skip_all, fields(start = scrape.pages.start, end = scrape.pages.end))]
pub async fn scrape_provider_pages(
    client: &impl Fetch,
    provider: &ProviderConfig,
    scrape: &PageScrapeConfig,
    matcher: &HostMatcher,
) -> Vec<String> {
    let mut hosts = BTreeSet::new();
    let mut fetched = 0;

    for n in scrape.pages.iter() {
        if fetched >= scrape.max_pages {
            break;
        }

        let url = provider.url_for(n);
        match client.fetch(&url, provider.timeout()).await {
            Ok(res) if res.is_ok() => {
                fetched += 1;
                let before = hosts.len();
                hosts.extend(matcher.find_in_text(&res.body));
                debug!("{url}: {} new host(s)", hosts.len() - before);
            }
            Ok(res) => debug!("{url}: status {}", res.status),
            Err(e) => debug!("{url}: {e:#}"),
        }
    }

    info!(
        "Scraped {fetched} provider page(s), found {} candidate host(s)",
        hosts.len()
    );
    hosts.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::NumberRange, http::fake::FakeFetch};

    fn matcher() -> HostMatcher {
        HostMatcher::new("zirvedesin", ".sbs").unwrap()
    }

    fn scrape(start: u32, end: u32, max_pages: usize) -> PageScrapeConfig {
        PageScrapeConfig {
            pages: NumberRange::new(start, end),
            max_pages,
        }
    }

    #[tokio::test]
    async fn extracts_only_mirror_hosts() {
        let client = FakeFetch::new().route(
            "https://dengetv67.live/",
            200,
            r#"<script src="https://foo.zirvedesin12.sbs/p.js"></script><a href="https://bar.other.com">"#,
        );

        let hosts =
            scrape_provider_pages(&client, &ProviderConfig::default(), &scrape(67, 67, 5), &matcher())
                .await;
        assert_eq!(hosts, ["foo.zirvedesin12.sbs"]);
    }

    #[tokio::test]
    async fn page_budget_counts_fetched_pages_only() {
        let client = FakeFetch::new()
            .route("https://dengetv68.live/", 200, "nothing here")
            .route("https://dengetv69.live/", 503, "")
            .route("https://dengetv70.live/", 200, "a.zirvedesin1.sbs")
            .route("https://dengetv71.live/", 200, "b.zirvedesin2.sbs");

        let hosts =
            scrape_provider_pages(&client, &ProviderConfig::default(), &scrape(67, 80, 2), &matcher())
                .await;

        // 67 unreachable, 68 fetched, 69 failed, 70 fetched, budget spent
        assert_eq!(hosts, ["a.zirvedesin1.sbs"]);
        assert_eq!(
            client.requested(),
            [
                "https://dengetv67.live/",
                "https://dengetv68.live/",
                "https://dengetv69.live/",
                "https://dengetv70.live/",
            ]
        );
    }
}
