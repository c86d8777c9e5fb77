//! HTTP handlers and route configuration.

mod auth;
mod health;
mod media;
mod posts;
mod profiles;
mod sse;
mod stories;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::resource("/auth/session")
                    .route(web::post().to(auth::create_session))
                    .route(web::get().to(auth::current_session)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    // Before "/{id}" so "live" is not read as a post id
                    .route("/live", web::get().to(posts::feed_live))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}/live", web::get().to(posts::post_live))
                    .route("/{id}/like", web::post().to(posts::toggle_like))
                    .route("/{id}/comments", web::post().to(posts::add_comment)),
            )
            .service(
                web::scope("/profiles")
                    .route("/{user_id}", web::get().to(profiles::get_profile))
                    .route("/{user_id}", web::put().to(profiles::update_profile))
                    .route("/{user_id}/live", web::get().to(profiles::profile_live)),
            )
            .route("/stories", web::get().to(stories::list_stories)),
    )
    .route("/media/{key:.*}", web::get().to(media::serve_media));
}
