use std::fmt;

pub mod base_url;
pub mod provider;

pub use base_url::find_base_stream_url;
pub use provider::find_working_provider;

/// Which discovery tier produced a resolved URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    CtLog,
    PageScrape,
    Heuristic,
    Probe,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cache => "cache",
            Self::CtLog => "CT-log",
            Self::PageScrape => "page scrape",
            Self::Heuristic => "heuristic",
            Self::Probe => "probe",
            Self::Default => "default",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub url: String,
    pub source: Source,
}

impl Resolved {
    fn new(url: impl Into<String>, source: Source) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}
