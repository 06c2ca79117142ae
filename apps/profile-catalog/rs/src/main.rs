use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_core::Controller;
use clap::Parser;
use profile_catalog::{router, spawn_feed_load, AppState, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile_catalog=info,catalog_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    let http = reqwest::Client::builder()
        .user_agent(format!("profile-catalog/{}", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    let controller = Controller::new(config.controller());
    let state = Arc::new(AppState::new(controller, config.public.clone()).with_wasm(config.wasm.clone()));
    spawn_feed_load(Arc::clone(&state), http, config.feed.clone());

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("profile catalog on http://localhost:{}", config.port);
    info!(feed = %config.feed, remote = config.feed_is_remote(), layout = %config.layout, "serving");
    if config.form_url.is_none() {
        info!("request form link disabled (set CATALOG_FORM_URL)");
    }

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
