//! Profile handlers.

use actix_web::{HttpResponse, web};
use serde_json::Value;

use pixgram_core::domain::ProfileUpdate;
use pixgram_core::ports::BlobPayload;
use pixgram_core::services::ProfileService;
use pixgram_core::views::ProfileView;
use pixgram_shared::dto::{UpdateProfileRequest, UpdateProfileResponse};

use super::sse;
use crate::middleware::auth::{OptionalSession, Session};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/profiles/{user_id}
///
/// Visiting your own profile creates it on first view.
pub async fn get_profile(
    state: web::Data<AppState>,
    OptionalSession(viewer): OptionalSession,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let mut view =
        ProfileView::mount(state.store.clone(), state.blobs.clone(), &path, viewer).await?;
    let profile = view.loaded().await;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/profiles/{user_id}/live
pub async fn profile_live(
    state: web::Data<AppState>,
    OptionalSession(viewer): OptionalSession,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let mut view =
        ProfileView::mount(state.store.clone(), state.blobs.clone(), &path, viewer).await?;
    view.loaded().await;
    Ok(sse::stream("profile", view.subscribe(), view))
}

/// PUT /api/profiles/{user_id}
pub async fn update_profile(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    if let Some(image) = &req.image {
        if !image.starts_with("data:") {
            return Err(AppError::Validation(vec!["image must be a data URL".to_string()]));
        }
        if image.len() > state.max_upload_bytes {
            return Err(AppError::PayloadTooLarge(state.max_upload_bytes));
        }
    }

    let update = ProfileUpdate {
        bio: req.bio,
        image: req.image.map(BlobPayload::DataUrl),
    };
    let written = ProfileService::new(state.store.clone(), state.blobs.clone())
        .update(&path, &session.user, update)
        .await?;

    let text = |key: &str| match written.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };
    Ok(HttpResponse::Ok().json(UpdateProfileResponse {
        bio: text("bio").unwrap_or_default(),
        profile_image: text("profileImage"),
    }))
}
