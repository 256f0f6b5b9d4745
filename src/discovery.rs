//! Producers of candidate stream-mirror hostnames.
//!
//! Each source returns bare hostnames (no scheme, no wildcard marker) and
//! treats every failure as "nothing found".

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

use crate::config::DiscoveryConfig;

pub mod ct_log;
pub mod heuristic;
pub mod page_scrape;

/// Recognises stream mirror hostnames such as `tible.zirvedesin13.sbs`
#[derive(Debug, Clone)]
pub struct HostMatcher {
    pattern: String,
    suffix: String,
    in_text: Regex,
}

impl HostMatcher {
    /// # Errors
    /// Errors if the pattern cannot be compiled into a regex
    pub fn new(pattern: &str, suffix: &str) -> Result<Self> {
        let in_text = RegexBuilder::new(&format!(
            r"[a-z0-9*.\-]+{}\d+{}",
            regex::escape(pattern),
            regex::escape(suffix)
        ))
        .case_insensitive(true)
        .build()
        .context("Building hostname regex")?;

        Ok(Self {
            pattern: pattern.to_string(),
            suffix: suffix.to_string(),
            in_text,
        })
    }

    /// # Errors
    /// See [`HostMatcher::new`]
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self> {
        Self::new(&config.host_pattern, &config.host_suffix)
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Accepts a single certificate name if it carries the pattern and ends
    /// with the suffix. Returns it without a wildcard marker.
    #[must_use]
    pub fn accept_name(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if !name.contains(&self.pattern) || !name.ends_with(&self.suffix) {
            return None;
        }
        let host = strip_wildcard(name);
        (!host.is_empty()).then(|| host.to_string())
    }

    /// Every matching hostname found anywhere in `text`, lower-cased
    pub fn find_in_text<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.in_text
            .find_iter(text)
            .map(|m| strip_wildcard(m.as_str()).to_ascii_lowercase())
            .filter(|host| !host.is_empty())
    }
}

/// Drops a leading `*.` (or any run of `*` and `.`) from a certificate name
#[must_use]
pub fn strip_wildcard(name: &str) -> &str {
    name.trim_start_matches(['*', '.'])
}
