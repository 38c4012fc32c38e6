//! Handlers for uploaded reference documents.

use axum::extract::{Multipart, Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::analysis::read_file_field;
use crate::response::Success;
use crate::state::AppState;
use crate::storage::content_type;

#[derive(Debug, Serialize)]
pub struct UploadPayload {
    pub message: String,
    pub filename: String,
}

/// POST /api/documents
///
/// Store the multipart `file` field under its sanitized name.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Success<UploadPayload>>> {
    let (raw_name, bytes) = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("No file part in the request".into()))?;

    let filename = state.documents.save(&raw_name, &bytes).await?;
    tracing::info!(%filename, size = bytes.len(), "Document uploaded");

    Ok(Json(Success::new(UploadPayload {
        message: format!("File {filename} uploaded successfully."),
        filename,
    })))
}

#[derive(Debug, Serialize)]
pub struct FileList {
    pub files: Vec<String>,
}

/// GET /api/documents
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Success<FileList>>> {
    let files = state.documents.list().await?;
    Ok(Json(Success::new(FileList { files })))
}

/// GET /api/documents/{filename}
pub async fn view(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<impl IntoResponse> {
    let bytes = state.documents.read(&filename).await?;
    Ok(([(CONTENT_TYPE, content_type(&filename))], bytes))
}
