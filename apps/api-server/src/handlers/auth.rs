//! Session handlers.

use actix_web::{HttpResponse, web};

use pixgram_core::domain::SessionUser;
use pixgram_shared::dto::{CreateSessionRequest, SessionResponse, SessionUserResponse};

use crate::middleware::auth::Session;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn user_response(user: SessionUser) -> SessionUserResponse {
    SessionUserResponse {
        name: user.name,
        email: user.email,
        image: user.image,
        username: user.username,
        uid: user.uid,
    }
}

/// POST /api/auth/session
///
/// Exchanges the provider's ID token for a session token.
pub async fn create_session(
    state: web::Data<AppState>,
    body: web::Json<CreateSessionRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    if req.id_token.trim().is_empty() {
        return Err(AppError::BadRequest("id_token is required".to_string()));
    }

    let identity = state.identities.verify(&req.id_token)?;
    let user = SessionUser::from_provider(identity);
    let issued = state.sessions.issue(&user)?;
    tracing::info!(email = %user.email, "Session created");

    Ok(HttpResponse::Ok().json(SessionResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
        user: user_response(user),
    }))
}

/// GET /api/auth/session
pub async fn current_session(session: Session) -> HttpResponse {
    HttpResponse::Ok().json(user_response(session.user))
}
