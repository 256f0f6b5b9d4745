use std::{ops::RangeInclusive, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Runtime configuration. Every literal list, range and fallback the resolvers
/// use lives here so mirror rotations only need a config change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the resolved base URL is cached between runs
    pub cache_file: String,
    /// How long a cached base URL is reused without re-validation
    pub cache_ttl_secs: u64,
    pub discovery: DiscoveryConfig,
    pub provider: ProviderConfig,
    pub playlist: PlaylistConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Substring every stream mirror hostname carries, e.g. `zirvedesin`
    pub host_pattern: String,
    /// Top-level suffix of stream mirror hostnames, e.g. `.sbs`
    pub host_suffix: String,
    /// Relay file requested on each candidate to prove it serves streams
    pub validation_path: String,
    pub validation_timeout_secs: u64,
    /// Concurrency width when validating CT-log and page-scrape candidates.
    /// `None` validates every candidate at once.
    pub validation_width: Option<usize>,
    pub ct_log_url: String,
    pub ct_log_timeout_secs: u64,
    pub page_scrape: PageScrapeConfig,
    pub heuristic: HeuristicConfig,
    /// Used when every discovery tier comes back empty
    pub default_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageScrapeConfig {
    pub pages: NumberRange,
    /// Stop after this many pages were fetched successfully
    pub max_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub prefixes: Vec<String>,
    pub suffixes: NumberRange,
    /// Candidates validated concurrently per chunk
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider index URL, `{n}` is replaced by the mirror number
    pub url_template: String,
    pub range: NumberRange,
    /// A live provider page mentions this somewhere in its body
    pub marker: String,
    pub timeout_secs: u64,
    pub probe_width: usize,
    pub default_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub group_title: String,
    pub user_agent: String,
    pub output_path: String,
    /// Pre-built playlist text appended verbatim after the generated channels
    pub fragment_url: Option<String>,
    pub fragment_timeout_secs: u64,
    /// Written in declaration order
    pub channels: Vec<ChannelEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub id: u32,
    pub file: String,
}

/// Inclusive numeric range as it appears in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    pub start: u32,
    pub end: u32,
}

impl NumberRange {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn iter(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl Config {
    /// Reads a JSON config file. Keys missing from the file keep their defaults.
    ///
    /// # Errors
    /// Errors when the file cannot be read or is not valid JSON for [`Config`]
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Parsing config file {}", path.display()))
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl DiscoveryConfig {
    #[must_use]
    pub const fn validation_timeout(&self) -> Duration {
        Duration::from_secs(self.validation_timeout_secs)
    }

    #[must_use]
    pub const fn ct_log_timeout(&self) -> Duration {
        Duration::from_secs(self.ct_log_timeout_secs)
    }
}

impl ProviderConfig {
    #[must_use]
    pub fn url_for(&self, n: u32) -> String {
        self.url_template.replace("{n}", &n.to_string())
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PlaylistConfig {
    #[must_use]
    pub const fn fragment_timeout(&self) -> Duration {
        Duration::from_secs(self.fragment_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_file: "cache.json".to_string(),
            cache_ttl_secs: 12 * 60 * 60,
            discovery: DiscoveryConfig::default(),
            provider: ProviderConfig::default(),
            playlist: PlaylistConfig::default(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            host_pattern: "zirvedesin".to_string(),
            host_suffix: ".sbs".to_string(),
            validation_path: "/yayinzirve.m3u8".to_string(),
            validation_timeout_secs: 8,
            validation_width: None,
            ct_log_url: "https://crt.sh/".to_string(),
            ct_log_timeout_secs: 20,
            page_scrape: PageScrapeConfig::default(),
            heuristic: HeuristicConfig::default(),
            default_base_url: "https://tible.zirvedesin13.sbs/".to_string(),
        }
    }
}

impl Default for PageScrapeConfig {
    fn default() -> Self {
        Self {
            pages: NumberRange::new(67, 200),
            max_pages: 5,
        }
    }
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            prefixes: ["tible", "kodiaq", "stream", "live", "media", "cdn", "video"]
                .map(String::from)
                .to_vec(),
            suffixes: NumberRange::new(10, 59),
            chunk_size: 50,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url_template: "https://dengetv{n}.live/".to_string(),
            range: NumberRange::new(67, 200),
            marker: "m3u8".to_string(),
            timeout_secs: 5,
            probe_width: 16,
            default_url: "https://dengetv58.live/".to_string(),
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            group_title: "Dengetv54".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            output_path: "output/dengetv54.m3u".to_string(),
            fragment_url: None,
            fragment_timeout_secs: 10,
            channels: default_channels(),
        }
    }
}

fn default_channels() -> Vec<ChannelEntry> {
    [
        (1, "yayinzirve"),
        (2, "yayin1"),
        (3, "yayininat"),
        (4, "yayinb2"),
        (5, "yayinb3"),
        (6, "yayinb4"),
        (7, "yayinb5"),
        (8, "yayinbm1"),
        (9, "yayinbm2"),
        (10, "yayinss"),
        (11, "yayinss2"),
        (13, "yayint1"),
        (14, "yayint2"),
        (15, "yayint3"),
        (16, "yayinsmarts"),
        (17, "yayinsms2"),
        (18, "yayintrtspor"),
        (19, "yayintrtspor2"),
        (20, "yayintrt1"),
        (21, "yayinas"),
        (22, "yayinatv"),
        (23, "yayintv8"),
        (24, "yayintv85"),
        (25, "yayinf1"),
        (26, "yayinnbatv"),
        (27, "yayineu1"),
        (28, "yayineu2"),
        (29, "yayinex1"),
        (30, "yayinex2"),
        (31, "yayinex3"),
        (32, "yayinex4"),
        (33, "yayinex5"),
        (34, "yayinex6"),
        (35, "yayinex7"),
        (36, "yayinex8"),
    ]
    .into_iter()
    .map(|(id, stem)| ChannelEntry {
        id,
        file: format!("{stem}.m3u8"),
    })
    .collect()
}
