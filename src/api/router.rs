use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{routing::get, Router};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use super::handlers::*;

/// Remote-shutdown switch shared between the handlers and the serve loop.
///
/// `/quitquitquit` flips the flag; the accept loop stops once notified and
/// in-flight requests run to completion.
#[derive(Default)]
pub struct Shutdown {
    flag: Mutex<bool>,
    notify: Notify,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) {
        *self.flag.lock() = true;
        // notify_one stores a permit, so begin-before-wait still wakes.
        self.notify.notify_one();
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.flag.lock()
    }

    /// Resolve once shutdown has begun.
    pub async fn wait(&self) {
        while !self.is_shutting_down() {
            self.notify.notified().await;
        }
    }
}

/// Application state shared across all handlers
pub struct AppState {
    /// Index files every query runs against; immutable after startup.
    pub index_paths: Vec<PathBuf>,
    pub shutdown: Arc<Shutdown>,
}

/// Create the HTTP router with all endpoints
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/", get(home))
        .route("/search", get(search))
        .route("/health", get(health_check))
        .route("/quitquitquit", get(quitquitquit))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
