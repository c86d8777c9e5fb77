//! Feed and post handlers.

use actix_web::{HttpResponse, web};

use pixgram_core::domain::PostDraft;
use pixgram_core::paths;
use pixgram_core::ports::BlobPayload;
use pixgram_core::services::{CommentService, LikeService, UploadSequencer};
use pixgram_core::views::{FeedView, PostView};
use pixgram_shared::dto::{CreateCommentRequest, CreatePostRequest, CreatedResponse, LikeResponse};

use super::sse;
use crate::middleware::auth::{OptionalSession, Session};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let feed = FeedView::load(state.store.as_ref()).await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// GET /api/posts/live
pub async fn feed_live(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let mut view = FeedView::mount(state.store.clone()).await?;
    view.loaded().await;
    Ok(sse::stream("feed", view.subscribe(), view))
}

fn validate_images(images: &[String], limit: usize) -> AppResult<()> {
    if images.is_empty() {
        return Err(AppError::Validation(vec![
            "Select at least one image".to_string(),
        ]));
    }

    let errors: Vec<String> = images
        .iter()
        .enumerate()
        .filter(|(_, image)| !image.starts_with("data:"))
        .map(|(i, _)| format!("images[{i}] must be a data URL"))
        .collect();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let total: usize = images.iter().map(String::len).sum();
    if total > limit {
        return Err(AppError::PayloadTooLarge(limit));
    }
    Ok(())
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    session: Session,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_images(&req.images, state.max_upload_bytes)?;

    let draft = PostDraft {
        caption: req.caption,
        location: req.location,
        hashtags: req.hashtags,
        tagged_users: req.tagged_users,
        images: req.images.into_iter().map(BlobPayload::DataUrl).collect(),
    };
    let sequencer = UploadSequencer::new(state.store.clone(), state.blobs.clone());
    let id = sequencer.upload_post(&session.user, draft).await?;

    Ok(HttpResponse::Created().json(CreatedResponse { id }))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    OptionalSession(viewer): OptionalSession,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let mut view = PostView::open(state.store.clone(), &path.into_inner(), viewer).await?;
    let detail = view.loaded().await;
    Ok(HttpResponse::Ok().json(detail))
}

/// GET /api/posts/{id}/live
pub async fn post_live(
    state: web::Data<AppState>,
    OptionalSession(viewer): OptionalSession,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let mut view = PostView::open(state.store.clone(), &path.into_inner(), viewer).await?;
    view.loaded().await;
    Ok(sse::stream("post", view.subscribe(), view))
}

async fn ensure_post(state: &AppState, post_id: &str) -> AppResult<()> {
    match state.store.get(&paths::post(post_id)?).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("post with id {post_id} not found"))),
    }
}

/// POST /api/posts/{id}/like
///
/// Reads the caller's like state fresh and flips it.
pub async fn toggle_like(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    ensure_post(&state, &post_id).await?;

    let likes = LikeService::new(state.store.clone());
    let has_liked = likes.has_liked(&post_id, &session.user.email).await?;
    let liked = likes.toggle(&post_id, &session.user, has_liked).await?;

    Ok(HttpResponse::Ok().json(LikeResponse { liked }))
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    ensure_post(&state, &post_id).await?;

    let id = CommentService::new(state.store.clone())
        .add(&post_id, &session.user, &body.comment)
        .await?;

    Ok(HttpResponse::Created().json(CreatedResponse { id }))
}
