//! Database file download.
//!
//! Only mounted when `DB_DOWNLOAD_PATH` is configured.

use crate::errors::ApiError;
use crate::routes::AppState;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::instrument;

/// Handler for GET /download_db
///
/// Streams the configured database file as an attachment.
#[instrument(skip_all, name = "tap.handlers.download_db")]
pub async fn download_db(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let path = state.config.db_download_path.as_ref().ok_or_else(|| {
        ApiError::NotFound("Database download is disabled".to_string())
    })?;

    let file = tokio::fs::File::open(path).await.map_err(|e| {
        tracing::error!(target: "tap.handlers.download", error = %e, "Failed to open database file");
        ApiError::Internal
    })?;

    let size = file.metadata().await.map_err(|e| {
        tracing::error!(target: "tap.handlers.download", error = %e, "Failed to stat database file");
        ApiError::Internal
    })?
    .len();

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("database.db");

    tracing::info!(target: "tap.handlers.download", size, "Database download started");

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
            (header::CONTENT_LENGTH, size.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    ))
}
