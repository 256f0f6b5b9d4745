use std::{future::Future, time::Duration};

use anyhow::{Context, Result};
use tracing::instrument;

/// A fully read HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub status: u16,
    pub body: String,
}

impl Fetched {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Issues a single bounded GET request and reads the whole body.
///
/// Every discovery step goes through this so it can run against a fake
/// transport in tests.
pub trait Fetch {
    /// # Errors
    /// Errors on any transport failure: timeout, DNS, connect, TLS or a body
    /// that cannot be read
    fn fetch(&self, url: &str, timeout: Duration) -> impl Future<Output = Result<Fetched>> + Send;
}

impl Fetch for reqwest::Client {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Fetched> {
        let res = self
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("Requesting {url}"))?;
        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .with_context(|| format!("Reading body of {url}"))?;

        Ok(Fetched { status, body })
    }
}
