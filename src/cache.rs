use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// The persisted resolution result.
///
/// Keys other than the two below are carried through untouched when the
/// record is rewritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_stream_url: Option<String>,
    /// Unix seconds of the write that stored `base_stream_url`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_ts: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CacheRecord {
    /// Returns the cached base URL if it was written less than `ttl` ago
    #[must_use]
    pub fn fresh_base_url(&self, now: f64, ttl: Duration) -> Option<&str> {
        let url = self.base_stream_url.as_deref().filter(|u| !u.is_empty())?;
        let ts = self.base_ts.filter(|ts| *ts > 0.0)?;
        (now - ts < ttl.as_secs_f64()).then_some(url)
    }

    pub fn set_base_url(&mut self, url: &str, now: f64) {
        self.base_stream_url = Some(url.to_string());
        self.base_ts = Some(now);
    }
}

/// Single-record JSON file store
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the record. A missing, unreadable or malformed file reads as an
    /// empty record.
    pub async fn load(&self) -> CacheRecord {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No usable cache at {}: {e}", self.path.display());
                return CacheRecord::default();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_else(|e| {
                debug!("Ignoring malformed cache record: {e}");
                CacheRecord::default()
            }),
            _ => {
                debug!("Ignoring cache file that is not a JSON object");
                CacheRecord::default()
            }
        }
    }

    /// Persists the record. Failures are logged and otherwise ignored.
    pub async fn save(&self, record: &CacheRecord) {
        if let Err(e) = self.try_save(record).await {
            warn!("Unable to write cache: {e:#}");
        }
    }

    async fn try_save(&self, record: &CacheRecord) -> Result<()> {
        let body = serde_json::to_string_pretty(record).context("Serializing cache record")?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");

        tokio::fs::write(&tmp, body)
            .await
            .context("Writing temporary cache file")?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .context("Replacing cache file")?;

        Ok(())
    }
}

/// Current wall-clock time as fractional unix seconds
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn unix_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(12 * 60 * 60);

    fn store_in(dir: &tempfile::TempDir) -> CacheStore {
        CacheStore::new(dir.path().join("cache.json"))
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load().await, CacheRecord::default());
    }

    #[tokio::test]
    async fn corrupt_or_non_object_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        for body in ["{ not json", "[1, 2, 3]", "\"text\"", r#"{"base_ts": "yesterday"}"#] {
            std::fs::write(store.path(), body).unwrap();
            assert_eq!(store.load().await, CacheRecord::default(), "{body}");
        }
    }

    #[tokio::test]
    async fn save_then_load_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"note": "kept", "base_ts": 1.5}"#).unwrap();

        let mut record = store.load().await;
        record.set_base_url("https://a.zirvedesin1.sbs/", 1000.0);
        store.save(&record).await;

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains('\n'), "cache should be pretty-printed");
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["note"], "kept");
        assert_eq!(value["base_stream_url"], "https://a.zirvedesin1.sbs/");
        assert_eq!(value["base_ts"], 1000.0);

        assert_eq!(store.load().await, record);
    }

    #[tokio::test]
    async fn failed_save_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("missing-dir").join("cache.json"));

        let mut record = CacheRecord::default();
        record.set_base_url("https://a.zirvedesin1.sbs/", 1.0);
        store.save(&record).await;

        assert_eq!(store.load().await, CacheRecord::default());
    }

    #[test]
    fn freshness_window() {
        let mut record = CacheRecord::default();
        assert_eq!(record.fresh_base_url(100.0, TTL), None);

        record.set_base_url("https://a.zirvedesin1.sbs/", 100.0);
        let ttl = TTL.as_secs_f64();
        assert_eq!(
            record.fresh_base_url(100.0 + ttl - 1.0, TTL),
            Some("https://a.zirvedesin1.sbs/")
        );
        assert_eq!(record.fresh_base_url(100.0 + ttl, TTL), None);

        record.base_ts = None;
        assert_eq!(record.fresh_base_url(100.0, TTL), None);
    }
}
