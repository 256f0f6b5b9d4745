use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use rlimit::Resource;
use tracing::{debug, warn};

/// Warns when the open-file limit cannot hold `fan_out` concurrent probes
/// with some headroom for the rest of the process.
pub fn warn_ulimit(fan_out: usize) {
    let limit = match rlimit::getrlimit(Resource::NOFILE) {
        Ok((soft, _)) => soft,
        Err(e) => {
            debug!("Unable to read file limit: {e}");
            return;
        }
    };

    let needed = u64::try_from(fan_out).unwrap_or(u64::MAX).saturating_mul(2);
    if limit <= needed {
        warn!(
            "Your file limit ({limit}) is low for {fan_out} parallel probes, some may fail spuriously. Consider raising it via `ulimit -n 10240`"
        );
    }
}

/// # Errors
/// Errors when the TLS backend cannot be initialised
pub fn init_http_client() -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "User-Agent",
        HeaderValue::from_str(&format!(
            "{}/{} (+{})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_REPOSITORY")
        ))
        .context("Building User-Agent header")?,
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("Unable to build HTTP client")
}
