use std::{collections::BTreeSet, time::Duration};

use reqwest::Url;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{discovery::HostMatcher, http::Fetch};

/// One row of the crt.sh JSON output. Only the names are of interest.
#[derive(Debug, Deserialize)]
pub struct CertificateRecord {
    #[serde(default)]
    pub name_value: Option<String>,
}

/// Searches the certificate-transparency log for names containing the
/// matcher's pattern.
///
/// Any non-200 answer or unparsable body counts as zero results.
#[instrument(skip(client, matcher), fields(pattern = matcher.pattern()))]
pub async fn query_ct_log(
    client: &impl Fetch,
    endpoint: &str,
    matcher: &HostMatcher,
    timeout: Duration,
) -> Vec<String> {
    let url = match Url::parse_with_params(
        endpoint,
        &[("q", format!("%{}%", matcher.pattern()).as_str()), ("output", "json")],
    ) {
        Ok(url) => url,
        Err(e) => {
            warn!("Invalid CT-log endpoint {endpoint}: {e}");
            return Vec::new();
        }
    };

    let res = match client.fetch(url.as_str(), timeout).await {
        Ok(res) if res.is_ok() => res,
        Ok(res) => {
            warn!("CT-log search answered with status {}", res.status);
            return Vec::new();
        }
        Err(e) => {
            warn!("CT-log search failed: {e:#}");
            return Vec::new();
        }
    };

    let records = match serde_json::from_str::<Vec<CertificateRecord>>(&res.body) {
        Ok(records) => records,
        Err(e) => {
            warn!("Unable to parse CT-log response: {e}");
            return Vec::new();
        }
    };

    let hosts = extract_hosts(&records, matcher);
    info!("CT-log returned {} candidate host(s)", hosts.len());
    hosts
}

/// Splits every record's (possibly multi-line) name field and keeps the
/// matching names, deduplicated and sorted.
#[must_use]
pub fn extract_hosts(records: &[CertificateRecord], matcher: &HostMatcher) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.name_value.as_deref())
        .flat_map(str::lines)
        .filter_map(|name| matcher.accept_name(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
