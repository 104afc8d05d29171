//! JSON HTTP API.
//!
//! One route per exposed operation of the core service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/scan` | Scan one batch (`{batch_size?, offset?}`) |
//! | `POST` | `/suggestions/generate` | Regenerate suggestions (`{target_doc_id}`) |
//! | `POST` | `/suggestions/{id}/status` | Review a suggestion (`{status}`) |
//! | `GET`  | `/targets/{id}/suggestions?status=` | Stored suggestions for a target |
//! | `GET`  | `/orphans?limit=&offset=` | Orphaned documents, newest first |
//! | `GET`  | `/orphans/count` | Number of orphaned documents |
//! | `GET`  | `/report?limit=` | Orphan report rows |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Invalid status: 'archived'. ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `conflict` (409),
//! `internal` (500). A review that the suggestion's current status does not
//! allow is a `conflict`.
//!
//! A failed generation (unknown target, no keywords) is not an HTTP error:
//! it returns `200` with `{ "success": false, "message": ... }`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use orphan_links_core::models::{
    GenerateOutcome, OrphanPage, OrphanReportRow, ScanOutcome, StatusFilter, StatusUpdate,
    Suggestion,
};
use orphan_links_core::orphans::DEFAULT_REPORT_LIMIT;
use orphan_links_core::AnalysisError;

use crate::app::{self, SqliteLinkService};
use crate::config::Config;

const DEFAULT_ORPHAN_PAGE: usize = 20;

#[derive(Clone)]
struct AppState {
    service: Arc<SqliteLinkService>,
}

/// Build the router over an existing service.
pub fn router(service: Arc<SqliteLinkService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/scan", post(handle_scan))
        .route("/suggestions/generate", post(handle_generate))
        .route("/suggestions/{id}/status", post(handle_update_status))
        .route("/targets/{id}/suggestions", get(handle_list_suggestions))
        .route("/orphans", get(handle_orphans))
        .route("/orphans/count", get(handle_orphan_count))
        .route("/report", get(handle_report))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { service })
}

/// Serve on `[server].bind` until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = Arc::new(app::open(config).await?);
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "HTTP server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn conflict(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::CONFLICT,
        code: "conflict",
        message: message.into(),
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidTarget(_) => not_found(err.to_string()),
            AnalysisError::NoKeywords(_) | AnalysisError::InvalidStatus(_) => {
                bad_request(err.to_string())
            }
        }
    }
}

/// Domain errors keep their status; anything else is a 500.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<AnalysisError>() {
            Ok(analysis) => analysis.into(),
            Err(err) => {
                error!(error = %err, "request failed");
                AppError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "internal",
                    message: err.to_string(),
                }
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /scan ============

#[derive(Deserialize)]
struct ScanRequest {
    batch_size: Option<usize>,
    #[serde(default)]
    offset: usize,
}

async fn handle_scan(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<ScanOutcome>, AppError> {
    let batch_size = req
        .batch_size
        .unwrap_or(state.service.settings().batch_size);
    if batch_size == 0 {
        return Err(bad_request("batch_size must be > 0"));
    }
    let outcome = state.service.scan_batch(batch_size, req.offset).await?;
    Ok(Json(outcome))
}

// ============ POST /suggestions/generate ============

#[derive(Deserialize)]
struct GenerateRequest {
    target_doc_id: i64,
}

async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateOutcome>, AppError> {
    let outcome = state
        .service
        .generate_suggestions(req.target_doc_id)
        .await?;
    Ok(Json(outcome))
}

// ============ POST /suggestions/{id}/status ============

#[derive(Deserialize)]
struct StatusRequest {
    status: String,
}

#[derive(Serialize)]
struct StatusResponse {
    success: bool,
    id: i64,
    status: String,
}

async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let update = state
        .service
        .update_suggestion_status_str(id, &req.status)
        .await?;
    match update {
        StatusUpdate::Updated => {}
        StatusUpdate::NotFound => {
            return Err(not_found(format!("no suggestion with id {}", id)));
        }
        StatusUpdate::NotAllowed { current } => {
            return Err(conflict(format!(
                "suggestion {} is {} and cannot move to '{}'",
                id, current, req.status
            )));
        }
    }
    Ok(Json(StatusResponse {
        success: true,
        id,
        status: req.status,
    }))
}

// ============ GET /targets/{id}/suggestions ============

#[derive(Deserialize)]
struct SuggestionQuery {
    status: Option<String>,
}

#[derive(Serialize)]
struct SuggestionList {
    count: usize,
    suggestions: Vec<Suggestion>,
}

async fn handle_list_suggestions(
    State(state): State<AppState>,
    Path(target): Path<i64>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<SuggestionList>, AppError> {
    let filter = match query.status.as_deref() {
        Some(s) => s.parse::<StatusFilter>()?,
        None => StatusFilter::default(),
    };
    let suggestions = state.service.get_suggestions(target, filter).await?;
    Ok(Json(SuggestionList {
        count: suggestions.len(),
        suggestions,
    }))
}

// ============ GET /orphans ============

#[derive(Deserialize)]
struct OrphanQuery {
    limit: Option<usize>,
    #[serde(default)]
    offset: usize,
}

#[derive(Serialize)]
struct OrphanList {
    orphans: Vec<OrphanPage>,
}

async fn handle_orphans(
    State(state): State<AppState>,
    Query(query): Query<OrphanQuery>,
) -> Result<Json<OrphanList>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_ORPHAN_PAGE);
    let orphans = state.service.get_orphans(limit, query.offset).await?;
    Ok(Json(OrphanList { orphans }))
}

#[derive(Serialize)]
struct CountResponse {
    count: u64,
}

async fn handle_orphan_count(
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, AppError> {
    let count = state.service.count_orphans().await?;
    Ok(Json(CountResponse { count }))
}

// ============ GET /report ============

#[derive(Deserialize)]
struct ReportQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct ReportResponse {
    rows: Vec<OrphanReportRow>,
}

async fn handle_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_REPORT_LIMIT);
    let rows = state.service.build_report(limit).await?;
    Ok(Json(ReportResponse { rows }))
}
