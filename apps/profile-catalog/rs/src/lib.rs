pub mod config;
pub mod error;
pub mod server;
pub mod source;

use std::sync::Arc;

use tracing::error;

pub use config::Config;
pub use server::{router, AppState};

/// Load the feed in the background and push the result to connected clients.
/// A failed load leaves the catalog empty and shows the error view.
pub fn spawn_feed_load(state: Arc<AppState>, http: reqwest::Client, location: String) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let result = source::load_feed(&http, &location).await.map_err(|e| {
            error!(source = %location, "feed load failed: {e:#}");
            format!("{e:#}")
        });
        state.controller().load(result);
        if let Err(e) = state.broadcast() {
            error!("broadcast failed: {e}");
        }
    })
}
