use std::path::PathBuf;
use std::time::Duration;

use catalog_core::{ControllerConfig, Layout};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "profile-catalog", version, about = "Serve the profile catalog")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "CATALOG_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Feed location: a file path or an http(s) URL
    #[arg(long, env = "CATALOG_FEED", default_value = "data/profiles.json")]
    pub feed: String,

    /// Directory of static assets
    #[arg(long, env = "CATALOG_PUBLIC", default_value = "public")]
    pub public: PathBuf,

    /// "Request a new entry" form; the link is hidden when unset
    #[arg(long, env = "CATALOG_FORM_URL")]
    pub form_url: Option<String>,

    /// Initial layout: cards or table
    #[arg(long, env = "CATALOG_LAYOUT", default_value = "cards")]
    pub layout: Layout,

    /// Search debounce delay in milliseconds
    #[arg(long, env = "CATALOG_DEBOUNCE_MS", default_value_t = 300)]
    pub debounce_ms: u64,

    /// Optional browser reducer module, served from the public directory
    #[arg(long, env = "CATALOG_WASM")]
    pub wasm: Option<String>,
}

impl Config {
    pub fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            layout: self.layout,
            form_url: self.form_url.clone(),
        }
    }

    pub fn feed_is_remote(&self) -> bool {
        is_remote(&self.feed)
    }
}

pub fn is_remote(feed: &str) -> bool {
    feed.starts_with("http://") || feed.starts_with("https://")
}
