//! HTTP Server for the boxoffice dashboard API.
//!
//! Serves read-only views over the cleaned dataset. The dataset is loaded
//! once at startup; if that fails the server still runs, but every data
//! endpoint answers `503` with the load error.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check and data status         |
//! | GET    | `/api/genres`     | Genres present in the dataset        |
//! | GET    | `/api/bounds`     | Slider limits and default filter     |
//! | GET    | `/api/dashboard`  | KPIs, charts and scatter samples     |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::{Query, State},
    http::{header, Method},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, log_info_indent, LOG_BROADCASTER};
use super::types::{BoundsResponse, DashboardParams, GenresResponse};
use crate::error::{ServerError, ServerResult};
use crate::query::{Dashboard, MovieStore, MovieTable};

/// Shared handler state: the loaded table, or why it could not be loaded.
#[derive(Debug, Clone)]
pub struct AppState {
    data: Result<Arc<MovieTable>, String>,
}

impl AppState {
    /// Load the store once. A load failure is logged and kept as the
    /// reason data endpoints are unavailable.
    pub fn load(store: &MovieStore) -> Self {
        let data = store.load().map_err(|e| {
            log_error(format!("{}", e));
            e.to_string()
        });
        Self { data }
    }

    pub fn from_table(table: MovieTable) -> Self {
        Self {
            data: Ok(Arc::new(table)),
        }
    }

    fn table(&self) -> ServerResult<&MovieTable> {
        self.data
            .as_deref()
            .map_err(|reason| ServerError::Unavailable(reason.clone()))
    }
}

/// Build the router. Split from [`start_server`] so handlers can be driven
/// without a socket.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/genres", get(genres))
        .route("/api/bounds", get(bounds))
        .route("/api/dashboard", get(dashboard))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(store: MovieStore, port: u16) -> ServerResult<()> {
    log_info(format!("Loading cleaned data from '{}'", store.path().display()));
    let state = AppState::load(&store);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    log_info(format!("Boxoffice server running on http://localhost:{}", port));
    log_info_indent("GET  /api/dashboard - KPIs and charts for a filter", 1);
    log_info_indent("GET  /api/genres    - Available genres", 1);
    log_info_indent("GET  /api/bounds    - Slider bounds and defaults", 1);
    log_info_indent("GET  /api/logs      - SSE log stream", 1);
    log_info_indent("GET  /health        - Health check", 1);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    let data = match &state.data {
        Ok(table) => json!({ "loaded": true, "movies": table.len(), "skipped": table.skipped() }),
        Err(reason) => json!({ "loaded": false, "error": reason }),
    };

    Json(json!({
        "status": "ok",
        "service": "boxoffice",
        "version": env!("CARGO_PKG_VERSION"),
        "data": data,
    }))
}

async fn genres(State(state): State<AppState>) -> ServerResult<Json<GenresResponse>> {
    let table = state.table()?;
    Ok(Json(GenresResponse {
        genres: table.available_genres(),
    }))
}

async fn bounds(State(state): State<AppState>) -> ServerResult<Json<BoundsResponse>> {
    Ok(Json(BoundsResponse::from_table(state.table()?)))
}

async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> ServerResult<Json<Dashboard>> {
    let table = state.table()?;
    let criteria = params.into_criteria(table)?;
    Ok(Json(Dashboard::build(table, criteria)))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
