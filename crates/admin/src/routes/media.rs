//! Media upload route handlers.
//!
//! Files are written to the configured media directory under a
//! UUID-prefixed name and served statically from `/media/files`; Postgres
//! only holds the metadata row.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use roastline_core::MediaAssetId;

use crate::db::MediaRepository;
use crate::db::media::MediaAsset;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdminAuth, RequireWriteAccess};
use crate::state::AppState;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart field name carrying the file.
const FILE_FIELD: &str = "file";

/// An asset together with the URL it is served from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAssetResponse {
    #[serde(flatten)]
    pub asset: MediaAsset,
    pub url: String,
}

impl From<MediaAsset> for MediaAssetResponse {
    fn from(asset: MediaAsset) -> Self {
        let url = format!("/media/files/{}", asset.file_name);
        Self { asset, url }
    }
}

/// Reduce an uploaded filename to a safe single path component.
///
/// Directory parts are dropped and anything outside `[A-Za-z0-9._-]`
/// becomes a dash; an unusable name falls back to `upload`.
fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim_matches('.');

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// List uploaded assets, newest first.
///
/// GET /media
#[instrument(skip(_admin, state))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<MediaAssetResponse>>> {
    let assets = MediaRepository::new(state.admin_pool()).list_all().await?;

    Ok(Json(
        assets.into_iter().map(MediaAssetResponse::from).collect(),
    ))
}

/// Accept a multipart upload and record it.
///
/// POST /media
#[instrument(skip(admin, state, multipart), fields(admin_id = %admin.id))]
pub async fn upload(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MediaAssetResponse>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original = field
            .file_name()
            .map_or_else(|| "upload".to_string(), sanitize_file_name);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        if data.is_empty() {
            return Err(AppError::BadRequest("uploaded file is empty".to_string()));
        }
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::BadRequest(format!(
                "upload exceeds {MAX_UPLOAD_BYTES} bytes"
            )));
        }

        let stored_name = format!("{}-{original}", Uuid::new_v4());
        let media_dir = &state.config().media_dir;
        let path = media_dir.join(&stored_name);

        tokio::fs::create_dir_all(media_dir)
            .await
            .map_err(|e| AppError::Internal(format!("failed to create media dir: {e}")))?;
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::Internal(format!("failed to store upload: {e}")))?;

        let size_bytes = i64::try_from(data.len()).unwrap_or(i64::MAX);
        let created = MediaRepository::new(state.admin_pool())
            .create(&stored_name, &content_type, size_bytes, admin.id)
            .await;

        let asset = match created {
            Ok(asset) => asset,
            Err(e) => {
                // Keep disk and metadata in step
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(file = %stored_name, error = %rm, "Failed to remove orphaned upload");
                }
                return Err(e.into());
            }
        };

        tracing::info!(asset_id = %asset.id, file = %asset.file_name, size_bytes, "Media uploaded");

        return Ok((StatusCode::CREATED, Json(asset.into())));
    }

    Err(AppError::BadRequest(format!(
        "missing multipart field `{FILE_FIELD}`"
    )))
}

/// Delete an asset's metadata and its file.
///
/// DELETE /media/{id}
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn remove(
    RequireWriteAccess(admin): RequireWriteAccess,
    State(state): State<AppState>,
    Path(id): Path<MediaAssetId>,
) -> Result<StatusCode> {
    let asset = MediaRepository::new(state.admin_pool()).delete(id).await?;

    let path = state.config().media_dir.join(&asset.file_name);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        // The metadata row is already gone; a missing file is not worth a 500
        tracing::warn!(file = %asset.file_name, error = %e, "Failed to remove media file");
    }

    tracing::info!(asset_id = %id, file = %asset.file_name, "Media deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_file_name("latte-art.jpg"), "latte-art.jpg");
        assert_eq!(sanitize_file_name("Roast_Chart.v2.png"), "Roast_Chart.v2.png");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\beans.jpg"), "beans.jpg");
    }

    #[test]
    fn test_sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_file_name("menu (final).pdf"), "menu--final-.pdf");
        assert_eq!(sanitize_file_name("café.jpg"), "caf-.jpg");
    }

    #[test]
    fn test_sanitize_falls_back_on_empty() {
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("..."), "upload");
    }
}
