use crate::{config::HeuristicConfig, discovery::HostMatcher};

/// Every `{prefix}.{pattern}{n}{suffix}` combination, prefix-major
#[must_use]
pub fn brute_force_candidates(config: &HeuristicConfig, matcher: &HostMatcher) -> Vec<String> {
    config
        .prefixes
        .iter()
        .flat_map(|prefix| {
            config.suffixes.iter().map(move |n| {
                format!("{prefix}.{}{n}{}", matcher.pattern(), matcher.suffix())
            })
        })
        .collect()
}
