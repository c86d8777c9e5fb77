//! Blob bytes for media URLs.

use actix_web::{HttpResponse, http::header, web};

use pixgram_core::paths::BlobKey;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /media/{key}
///
/// URLs carry the object version, so a response never goes stale.
pub async fn serve_media(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let key = path.into_inner();
    let blob_key = BlobKey::parse(&key).ok_or_else(|| AppError::NotFound(key.clone()))?;
    let blob = state
        .blobs
        .get(&blob_key)
        .await?
        .ok_or(AppError::NotFound(key))?;

    Ok(HttpResponse::Ok()
        .content_type(blob.content_type)
        .insert_header((header::CACHE_CONTROL, "public, max-age=31536000, immutable"))
        .insert_header((header::ETAG, format!("\"{}\"", blob.version)))
        .body(blob.data))
}
