use std::time::Duration;

use tracing::{debug, instrument};

use crate::http::Fetch;

/// Requests `https://{host}{path}` once and returns `https://{host}/` when the
/// host answers 200 with a non-blank body.
///
/// Transport errors count as a failed validation.
#[instrument(skip(client, timeout))]
pub async fn validate_host(
    client: &impl Fetch,
    host: &str,
    path: &str,
    timeout: Duration,
) -> Option<String> {
    let url = format!("https://{host}{path}");
    match client.fetch(&url, timeout).await {
        Ok(res) if res.is_ok() && !res.body.trim().is_empty() => Some(format!("https://{host}/")),
        Ok(res) => {
            debug!("Rejected {host}: status {}", res.status);
            None
        }
        Err(e) => {
            debug!("Rejected {host}: {e:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeFetch;

    const PATH: &str = "/yayinzirve.m3u8";
    const TIMEOUT: Duration = Duration::from_secs(8);

    #[tokio::test]
    async fn accepts_200_with_body() {
        let client = FakeFetch::new().route(
            "https://a.zirvedesin7.sbs/yayinzirve.m3u8",
            200,
            "#EXTM3U\n",
        );

        let found = validate_host(&client, "a.zirvedesin7.sbs", PATH, TIMEOUT).await;
        assert_eq!(found.as_deref(), Some("https://a.zirvedesin7.sbs/"));
        assert_eq!(
            client.requested(),
            ["https://a.zirvedesin7.sbs/yayinzirve.m3u8"]
        );
    }

    #[tokio::test]
    async fn rejects_blank_body_bad_status_and_transport_errors() {
        let client = FakeFetch::new()
            .route("https://blank.zirvedesin7.sbs/yayinzirve.m3u8", 200, " \n\t")
            .route("https://gone.zirvedesin7.sbs/yayinzirve.m3u8", 404, "not found")
            .route("https://moved.zirvedesin7.sbs/yayinzirve.m3u8", 302, "elsewhere");

        for host in [
            "blank.zirvedesin7.sbs",
            "gone.zirvedesin7.sbs",
            "moved.zirvedesin7.sbs",
            "down.zirvedesin7.sbs",
        ] {
            assert_eq!(validate_host(&client, host, PATH, TIMEOUT).await, None, "{host}");
        }
    }
}
