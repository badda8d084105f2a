use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::pages;
use crate::api::response::{ApiError, AppForm, AppPath, NOT_FOUND_MESSAGE};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EditRecordForm {
    #[serde(default)]
    pub description: String,
}

/// The `file` part of an upload
struct UploadedFile {
    filename: String,
    data: Bytes,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn upload_form() -> Html<String> {
    Html(pages::upload_page())
}

pub async fn upload_record(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let mut file: Option<UploadedFile> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart data", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file", e))?;

                if data.len() as u64 > state.config.max_upload_size {
                    return Err(ApiError::payload_too_large(format!(
                        "File exceeds maximum upload size of {} bytes",
                        state.config.max_upload_size
                    )));
                }

                file = Some(UploadedFile { filename, data });
            }
            "description" => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error("Invalid description", e))?,
                );
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let file = file.ok_or_else(|| ApiError::bad_request("No file part"))?;
    if file.filename.is_empty() {
        return Err(ApiError::bad_request("No selected file"));
    }

    let id = state
        .db
        .create_record(&file.filename, description.as_deref(), &file.data)?;

    tracing::debug!(record_id = id, filename = %file.filename, bytes = file.data.len(), "Created record");

    Ok(Redirect::to("/files"))
}

pub async fn list_records(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let records = state.db.list_records()?;
    Ok(Html(pages::list_page(&records)))
}

pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Html<String>, ApiError> {
    let record = state.db.get_summary(id)?;
    Ok(Html(pages::edit_page(&record)))
}

pub async fn update_record(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
    AppForm(form): AppForm<EditRecordForm>,
) -> Result<Redirect, ApiError> {
    state.db.update_description(id, &form.description)?;

    tracing::debug!(record_id = id, "Updated record description");
    Ok(Redirect::to("/files"))
}

pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<u64>,
) -> Result<Redirect, ApiError> {
    // The store treats a missing id as a no-op; the user still hears about it
    if !state.db.delete_record(id)? {
        return Err(ApiError::not_found(NOT_FOUND_MESSAGE));
    }

    tracing::debug!(record_id = id, "Deleted record");
    Ok(Redirect::to("/files"))
}

// ============================================================================
// Helpers
// ============================================================================

/// Bodies cut off by the router's length limit answer 413; anything else is
/// a malformed request.
fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(format!("{context}: {}", e.body_text()))
    } else {
        ApiError::bad_request(format!("{context}: {e}"))
    }
}
