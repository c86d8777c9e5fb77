//! Story strip.

use actix_web::{HttpResponse, web};

use pixgram_core::views::{FeedView, stories};

use crate::middleware::auth::OptionalSession;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/stories
pub async fn list_stories(
    state: web::Data<AppState>,
    OptionalSession(viewer): OptionalSession,
) -> AppResult<HttpResponse> {
    let feed = FeedView::load(state.store.as_ref()).await?;
    Ok(HttpResponse::Ok().json(stories(viewer.as_ref(), &feed)))
}
