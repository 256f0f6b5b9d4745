use std::{path::Path, sync::LazyLock};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    config::{ChannelEntry, PlaylistConfig},
    http::Fetch,
};

static DIGIT_GROUP_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

/// Turns a relay file name into a display name: `yayinb2.m3u8` -> `Yayinb 2`
#[must_use]
pub fn channel_display_name(file: &str) -> String {
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    title_case(&DIGIT_GROUP_REGEX.replace_all(stem, " $1"))
}

/// Upper-cases a letter when the character before it is not a letter and
/// lower-cases it otherwise
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut after_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
        } else {
            out.push(c);
        }
        after_letter = c.is_alphabetic();
    }
    out
}

/// The four lines describing one channel
#[must_use]
pub fn channel_lines(
    config: &PlaylistConfig,
    channel: &ChannelEntry,
    base_url: &str,
    referrer: &str,
) -> [String; 4] {
    [
        format!(
            "#EXTINF:-1 group-title=\"{}\",{}",
            config.group_title,
            channel_display_name(&channel.file)
        ),
        format!("#EXTVLCOPT:http-user-agent={}", config.user_agent),
        format!("#EXTVLCOPT:http-referrer={referrer}"),
        format!("{base_url}{}", channel.file),
    ]
}

/// Builds the playlist text: header, every channel in table order, then the
/// optional fragment verbatim
#[must_use]
pub fn assemble(
    config: &PlaylistConfig,
    base_url: &str,
    referrer: &str,
    fragment: Option<&str>,
) -> String {
    let mut lines = vec!["#EXTM3U".to_string()];
    for channel in &config.channels {
        lines.extend(channel_lines(config, channel, base_url, referrer));
    }
    if let Some(fragment) = fragment {
        lines.push(fragment.to_string());
    }
    lines.join("\n")
}

/// Downloads the extra playlist fragment. Failures are logged and skipped.
#[instrument(skip(client, timeout))]
pub async fn fetch_fragment(
    client: &impl Fetch,
    url: &str,
    timeout: std::time::Duration,
) -> Option<String> {
    match client.fetch(url, timeout).await {
        Ok(res) if res.is_ok() => Some(res.body),
        Ok(res) => {
            warn!("Skipping playlist fragment, status {}", res.status);
            None
        }
        Err(e) => {
            warn!("Skipping playlist fragment: {e:#}");
            None
        }
    }
}

/// Writes the playlist, creating the parent directory first
///
/// # Errors
/// Errors when the directory or the file cannot be written
pub async fn write_playlist(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Creating output directory {}", parent.display()))?;
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Writing playlist {}", path.display()))?;

    info!("Playlist written to {}", path.display());
    Ok(())
}
