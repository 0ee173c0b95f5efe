use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use friplass_store::UploadError;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{listings::OkResponse, ApiError, AppState};

const FILE_FIELDS: [&str; 2] = ["files", "file"];

#[derive(Debug, Serialize)]
pub(super) struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct DeleteUploadRequest {
    pub url: String,
}

fn upload_error(req_id: String, error: &UploadError) -> ApiError {
    if error.status() >= 500 {
        tracing::error!(error = %error, "upload failed");
        ApiError::new(req_id, "internal_error", "Upload failed")
    } else {
        ApiError::new(req_id, "bad_request", error.to_string())
    }
}

/// `POST /uploads`: store the first file part and return its public URL.
pub(super) async fn upload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(ApiError::new(req_id.0, "bad_request", e.body_text())),
        };
        if !field.name().is_some_and(|name| FILE_FIELDS.contains(&name)) {
            continue;
        }
        let file_name = field.file_name().map(ToOwned::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;

        let stored = state
            .uploads
            .save(file_name.as_deref(), &bytes)
            .await
            .map_err(|e| upload_error(req_id.0.clone(), &e))?;
        return Ok(Json(UploadResponse { url: stored.url }));
    }
    Err(upload_error(req_id.0, &UploadError::MissingFile))
}

/// `DELETE /uploads`: best-effort removal; always answers `{ok: true}`.
pub(super) async fn delete_upload(
    State(state): State<AppState>,
    body: Result<Json<DeleteUploadRequest>, JsonRejection>,
) -> Json<OkResponse> {
    match body {
        Ok(Json(req)) => state.uploads.delete_best_effort(&req.url).await,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "ignoring malformed upload delete");
        }
    }
    Json(OkResponse { ok: true })
}

fn content_type(file: &str) -> &'static str {
    let ext = file
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "avif" => "image/avif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// `GET <prefix>/{file}`: serve a stored upload.
pub(super) async fn serve_upload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let url = format!("{}/{file}", state.config.uploads_url_prefix);
    let not_found = |id: String| ApiError::new(id, "not_found", "Fant ikke filen.");
    let path = state
        .uploads
        .resolve(&url)
        .ok_or_else(|| not_found(req_id.0.clone()))?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| not_found(req_id.0.clone()))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type(&file))],
        bytes,
    )
        .into_response())
}
