use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, Method},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::AppError,
    models::Dataset,
    services::{
        dashboard::{self, DashboardView},
        fetch,
        sheet::{self, export, FileKind, SchemaMode},
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/datasets/upload", post(upload_dataset))
        .route("/datasets/analyze", post(analyze_dataset))
        .route("/datasets/export", post(export_dataset))
        .layer(cors)
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    file_name: String,
    content_type: Option<String>,
    strict: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    file_name: String,
    content_type: Option<String>,
    signed_url: String,
    strict: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetResponse {
    file_name: String,
    row_count: usize,
    dataset: Dataset,
    #[serde(flatten)]
    view: DashboardView,
}

async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DatasetResponse>, AppError> {
    tracing::info!("Received upload {} ({} bytes)", query.file_name, body.len());
    let content_type = upload_content_type(query.content_type, &headers);
    let response = process_file(
        &state,
        query.file_name,
        content_type.as_deref(),
        query.strict,
        body,
    )
    .await?;
    Ok(Json(response))
}

#[axum::debug_handler]
async fn analyze_dataset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<DatasetResponse>, AppError> {
    if request.signed_url.trim().is_empty() {
        return Err(AppError::InvalidInput("No file URL provided".to_string()));
    }

    // Reject unsupported kinds before downloading anything
    FileKind::detect(&request.file_name, request.content_type.as_deref())?;

    let download_start = std::time::Instant::now();
    let bytes = fetch::load_file_from_url(
        &state.http,
        &request.signed_url,
        state.config.max_file_size,
    )
    .await?;
    tracing::info!(
        "File downloaded, size: {}KB, took: {:?}",
        bytes.len() / 1024,
        download_start.elapsed()
    );

    let response = process_file(
        &state,
        request.file_name,
        request.content_type.as_deref(),
        request.strict,
        bytes,
    )
    .await?;
    Ok(Json(response))
}

async fn export_dataset(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let content_type = upload_content_type(query.content_type, &headers);
    let kind = FileKind::detect(&query.file_name, content_type.as_deref())?;
    let mode = schema_mode(&state, query.strict);
    check_size(&state, &body)?;

    let csv = tokio::task::spawn_blocking(move || {
        let dataset = sheet::ingest(&body, kind, mode)?;
        export::to_csv(&dataset.columns, &dataset.data)
    })
    .await??;

    tracing::info!("Exported {} as CSV ({} bytes)", query.file_name, csv.len());
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv))
}

async fn process_file(
    state: &AppState,
    file_name: String,
    content_type: Option<&str>,
    strict: Option<bool>,
    bytes: Bytes,
) -> Result<DatasetResponse, AppError> {
    let kind = FileKind::detect(&file_name, content_type)?;
    let mode = schema_mode(state, strict);
    check_size(state, &bytes)?;
    let preview_rows = state.config.preview_rows;

    let (mut dataset, view) = tokio::task::spawn_blocking(move || {
        let dataset = sheet::ingest(&bytes, kind, mode)?;
        let view = dashboard::build_view(&dataset);
        Ok::<_, crate::error::IngestError>((dataset, view))
    })
    .await??;

    let row_count = dataset.row_count();
    dataset.data.truncate(preview_rows);
    tracing::info!(
        "Processed {}: {} rows, {} columns, {} KPI cards",
        file_name,
        row_count,
        dataset.columns.len(),
        view.kpis.len()
    );

    Ok(DatasetResponse {
        file_name,
        row_count,
        dataset,
        view,
    })
}

/// The `content_type` parameter wins; otherwise the body's own media type,
/// unless it is the generic octet-stream.
fn upload_content_type(declared: Option<String>, headers: &HeaderMap) -> Option<String> {
    declared.or_else(|| {
        let value = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
        let mime = value.split(';').next().unwrap_or(value).trim().to_lowercase();
        (!mime.is_empty() && mime != "application/octet-stream").then_some(mime)
    })
}

fn schema_mode(state: &AppState, strict: Option<bool>) -> SchemaMode {
    strict
        .map(SchemaMode::from_strict_flag)
        .unwrap_or(state.config.schema_mode)
}

fn check_size(state: &AppState, bytes: &Bytes) -> Result<(), AppError> {
    if bytes.len() > state.config.max_file_size {
        return Err(AppError::PayloadTooLarge(state.config.max_file_size));
    }
    Ok(())
}
