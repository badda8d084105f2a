use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

use crate::api::pages;
use crate::api::response::{attachment, ApiError, AppPath};
use crate::convert;
use crate::AppState;

/// Serve the decoded text of an upload.
/// Route: GET /view_raw/:id
pub async fn view_raw(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Response, ApiError> {
    let record = state.db.get_record(id)?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        record.raw_text,
    )
        .into_response())
}

/// Serve the upload's original bytes under its original filename.
/// Route: GET /download_csv/:id
pub async fn download_csv(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Response, ApiError> {
    let record = state.db.get_record(id)?;
    Ok(attachment("text/csv", &record.filename, record.raw_bytes))
}

/// Route: GET /convert_to_parquet/:id
pub async fn convert_to_parquet(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Response, ApiError> {
    let record = state.db.get_record(id)?;
    let data = convert::to_columnar(&record.raw_text)?;

    tracing::debug!(record_id = id, bytes = data.len(), "Converted record to parquet");
    Ok(attachment(
        "application/octet-stream",
        &record.parquet_filename(),
        data,
    ))
}

/// Route: GET /view_parquet/:id
pub async fn view_parquet(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Html<String>, ApiError> {
    let record = state.db.get_record(id)?;
    let table = convert::to_html_table(&record.raw_text)?;
    Ok(Html(pages::table_page(&record.filename, &table)))
}
