use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;
use tracing::info;

use crate::infra::app_state::AppState;
use crate::infra::errors::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Take the multipart `photo` field, hand the bytes to the file-storage
/// collaborator, and answer with the hosted URL. Creating the listing is
/// a separate, later request.
pub async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("invalid multipart request: {e}")))?
    {
        if field.name() != Some("photo") {
            continue;
        }

        let filename = field.file_name().unwrap_or("photo.jpg").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("failed to read uploaded file: {e}")))?;

        let url = state.storage.store(&filename, &bytes).await?;
        info!("uploaded {filename} ({} bytes) to {url}", bytes.len());
        return Ok(Json(UploadResponse { url }));
    }

    Err(AppError::bad_request("No file uploaded"))
}
