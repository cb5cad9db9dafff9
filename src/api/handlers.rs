use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::error::TrawlerError;
use crate::query::QueryProcessor;
use crate::tokenizer::split_query;

use super::router::AppState;
use super::types::*;

static HOME_PAGE: &str = "<html><head><title>trawler</title></head>\n\
    <body>\n\
    <center><h1>trawler</h1>\n\
    <form action=\"/search\" method=\"get\">\n\
    <input type=\"text\" size=30 name=\"terms\" />\n\
    <input type=\"submit\" value=\"Search\" />\n\
    </form></center>\n\
    </body></html>\n";

/// Error wrapper for API handlers
pub enum ApiError {
    Trawler(TrawlerError),
    BadRequest(String),
    Internal(String),
}

impl From<TrawlerError> for ApiError {
    fn from(e: TrawlerError) -> Self {
        ApiError::Trawler(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Trawler(e) => {
                let (status, error_type) = match &e {
                    TrawlerError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
                    TrawlerError::CorruptIndex { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "corrupt_index")
                    }
                    TrawlerError::NotADirectory(_) => (StatusCode::BAD_REQUEST, "not_a_directory"),
                    TrawlerError::IndexTooLarge(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "index_too_large")
                    }
                    TrawlerError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
                };
                (status, error_type, e.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorResponse::new(error_type, message);
        (status, Json(body)).into_response()
    }
}

/// Search form landing page
pub async fn home() -> impl IntoResponse {
    Html(HOME_PAGE)
}

/// Run a conjunctive query against every configured index file
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let start = std::time::Instant::now();

    let words = split_query(&params.terms);
    if words.is_empty() {
        return Err(ApiError::BadRequest(
            "query must contain at least one word".to_string(),
        ));
    }

    // Each query owns its reader handles for its whole lifetime, so
    // concurrent requests never contend on a file handle. Lookups are
    // disk-bound seek+read work; keep them off the async workers.
    let index_paths = state.index_paths.clone();
    let results = tokio::task::spawn_blocking(move || {
        QueryProcessor::open(&index_paths, false)?.process_query(&words)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("query task failed: {e}")))??;

    Ok(Json(SearchResponse {
        results,
        took_ms: start.elapsed().as_millis() as u64,
    }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Remote shutdown: stop accepting connections, finish in-flight work
pub async fn quitquitquit(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("shutdown requested via /quitquitquit");
    state.shutdown.begin();
    "shutting down\n"
}
