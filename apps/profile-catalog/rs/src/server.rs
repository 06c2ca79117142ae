use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use catalog_core::{action_from_parts, render_view, snapshot, Action, Controller, Outcome};
use catalog_render_html::{render_page, PageOptions};
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use crate::error::AppError;

// ── Shared state ────────────────────────────────────────────────────

pub struct AppState {
    controller: Mutex<Controller>,
    /// Clock origin for the controller's timestamps.
    started: Instant,
    updates: broadcast::Sender<String>,
    pub public_dir: PathBuf,
    pub wasm_url: Option<String>,
}

impl AppState {
    pub fn new(controller: Controller, public_dir: PathBuf) -> Self {
        let (updates, _) = broadcast::channel(64);
        Self {
            controller: Mutex::new(controller),
            started: Instant::now(),
            updates,
            public_dir,
            wasm_url: None,
        }
    }

    pub fn with_wasm(mut self, url: Option<String>) -> Self {
        self.wasm_url = url;
        self
    }

    /// The controller only lives behind a lock because handlers must be `Send`;
    /// a poisoned lock still holds consistent state.
    pub fn controller(&self) -> MutexGuard<'_, Controller> {
        self.controller.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn now(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.updates.subscribe()
    }

    /// Push the current snapshot to every SSE client.
    pub fn broadcast(&self) -> Result<(), AppError> {
        let json = serde_json::to_string(&snapshot(&self.controller()))?;
        // No subscribers is fine
        let _ = self.updates.send(json);
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.public_dir);
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/sse", get(sse))
        .route("/actions/:name", post(action))
        .fallback_service(assets)
        .with_state(state)
}

// ── Handlers ────────────────────────────────────────────────────────

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let profiles = state.controller().catalog().len();
    Json(serde_json::json!({ "status": "ok", "profiles": profiles }))
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let root = render_view(state.controller().view());
    let mut opts = PageOptions::new(root);
    opts.title = Some("Profile Catalog".into());
    opts.description = Some("Searchable catalog of avatar profiles".into());
    opts.styles.push("/catalog.css".into());
    opts.scripts.push("/catalog-client.js".into());
    opts.sse_url = Some("/sse".into());
    opts.mount_selector = Some("#app".into());
    opts.wasm_url = state.wasm_url.clone();
    Html(render_page(&opts))
}

async fn sse(State(state): State<Arc<AppState>>) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Subscribe before rendering so no update falls between the two
    let rx = state.subscribe();
    let initial = serde_json::to_string(&snapshot(&state.controller()))?;
    debug!(clients = state.updates.receiver_count(), "sse client connected");

    let updates = BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("sse client lagged: {e}");
                None
            }
        }
    });
    let events = stream::once(async move { initial })
        .chain(updates)
        .map(|json| Ok::<_, Infallible>(Event::default().event("message").data(json)));

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(30))))
}

async fn action(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload_of(&body)?;
    let action = action_from_parts(&name, &payload);
    if action == Action::Unknown {
        debug!(%name, "ignoring unknown action");
    }

    let (outcome, json) = {
        let mut controller = state.controller();
        let outcome = controller.handle(action, state.now());
        (outcome, serde_json::to_string(&snapshot(&controller))?)
    };

    match outcome {
        Outcome::Recomputed => {
            let _ = state.updates.send(json.clone());
        }
        Outcome::Deferred { due } => schedule_tick(Arc::clone(&state), due),
        Outcome::Unchanged => {}
    }

    Ok(([(header::CONTENT_TYPE, "application/json")], json))
}

/// Accepts either the bare payload or the full `{"action","payload"}` envelope.
fn payload_of(body: &[u8]) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    let value: Value = serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    match value {
        Value::Object(mut obj) if obj.contains_key("action") => Ok(obj.remove("payload").unwrap_or(Value::Null)),
        other => Ok(other),
    }
}

/// Wake up once the pending search is due. A wake-up that finds a newer
/// deadline does nothing; the newer push scheduled its own.
fn schedule_tick(state: Arc<AppState>, due: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep_until(state.started + due).await;
        let outcome = state.controller().tick(state.now());
        if outcome == Outcome::Recomputed {
            if let Err(e) = state.broadcast() {
                warn!("broadcast failed: {e}");
            }
        }
    });
}
