//! Fetching the feed document from disk or over HTTP.

use anyhow::{Context, Result};
use catalog_core::Feed;
use tracing::info;

use crate::config::is_remote;

pub async fn load_feed(http: &reqwest::Client, location: &str) -> Result<Feed> {
    let json = if is_remote(location) {
        http.get(location)
            .send()
            .await
            .with_context(|| format!("fetch failed: {location}"))?
            .error_for_status()
            .with_context(|| format!("bad status from {location}"))?
            .text()
            .await
            .with_context(|| format!("read failed: {location}"))?
    } else {
        tokio::fs::read_to_string(location)
            .await
            .with_context(|| format!("read failed: {location}"))?
    };

    let feed = Feed::from_json(&json).with_context(|| format!("invalid feed: {location}"))?;
    info!(
        source = %location,
        profiles = feed.profiles.len(),
        dropped = feed.dropped.len(),
        "feed loaded"
    );
    Ok(feed)
}
