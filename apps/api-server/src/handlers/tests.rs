use std::future::poll_fn;
use std::pin::pin;

use actix_web::body::MessageBody;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};

use pixgram_core::domain::{ProviderIdentity, SessionUser};
use pixgram_infra::{JwtConfig, OAuthConfig};

use super::configure_routes;
use crate::state::AppState;

const BASE_URL: &str = "http://pixgram.test";
const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

fn oauth() -> OAuthConfig {
    OAuthConfig {
        client_id: "pixgram-test".to_string(),
        client_secret: "oauth-test-secret".to_string(),
        issuer: "https://accounts.example.com".to_string(),
    }
}

fn state() -> web::Data<AppState> {
    let session = JwtConfig {
        secret: "session-test-secret".to_string(),
        expiration_hours: 1,
        issuer: "pixgram-test".to_string(),
    };
    web::Data::new(AppState::in_memory(BASE_URL, session, oauth()))
}

fn user(name: &str, email: &str) -> SessionUser {
    SessionUser::from_provider(ProviderIdentity {
        sub: format!("sub-{email}"),
        name: name.to_string(),
        email: email.to_string(),
        image: Some(format!("https://img.example.com/{email}")),
    })
}

fn bearer(state: &AppState, user: &SessionUser) -> (header::HeaderName, String) {
    let issued = state.sessions.issue(user).unwrap();
    (header::AUTHORIZATION, format!("Bearer {}", issued.token))
}

fn id_token(email: &str, name: &str) -> String {
    let config = oauth();
    let claims = json!({
        "sub": "google-123",
        "email": email,
        "name": name,
        "aud": config.client_id,
        "iss": config.issuer,
        "exp": (Utc::now() + TimeDelta::minutes(5)).timestamp(),
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.client_secret.as_bytes()),
    )
    .unwrap()
}

fn new_post(caption: &str, images: usize) -> Value {
    json!({
        "caption": caption,
        "location": "Lisbon",
        "images": vec![PNG; images],
    })
}

#[actix_web::test]
async fn test_health_check() {
    let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_session_exchange() {
    let state = state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/session")
        .set_json(json!({"id_token": id_token("ada@example.com", "Ada Lovelace")}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["username"], "adalovelace");

    let token = body["access_token"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri("/api/auth/session")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["email"], "ada@example.com");
}

#[actix_web::test]
async fn test_forged_id_token_rejected() {
    let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

    let forged = encode(
        &Header::default(),
        &json!({"sub": "x", "email": "eve@example.com", "aud": "pixgram-test",
                "iss": "https://accounts.example.com", "exp": Utc::now().timestamp() + 60}),
        &EncodingKey::from_secret(b"wrong"),
    )
    .unwrap();
    let req = test::TestRequest::post()
        .uri("/api/auth/session")
        .set_json(json!({"id_token": forged}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_upload_requires_session() {
    let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(new_post("hi", 1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 401);
    assert_eq!(body["title"], "Sign-in Required");
}

#[actix_web::test]
async fn test_upload_then_read_feed_and_media() {
    let state = state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;
    let ada = user("Ada Lovelace", "ada@example.com");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, &ada))
        .set_json(new_post("hello #x", 3))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let post_id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let feed: Value = test::call_and_read_body_json(&app, req).await;
    let post = &feed["posts"][0];
    assert_eq!(post["id"], post_id);
    assert_eq!(post["hashtags"], json!(["#x"]));
    assert_eq!(post["images"].as_array().unwrap().len(), 3);
    assert_eq!(post["image"], post["images"][0]);

    let url = post["images"][1].as_str().unwrap();
    let media_path = url.strip_prefix(BASE_URL).unwrap();
    assert!(media_path.starts_with(&format!("/media/posts/{post_id}/1")));

    let req = test::TestRequest::get().uri(media_path).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
}

#[actix_web::test]
async fn test_upload_without_images_is_rejected() {
    let state = state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;
    let ada = user("Ada Lovelace", "ada@example.com");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, &ada))
        .set_json(new_post("nothing", 0))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let feed: Value = test::call_and_read_body_json(&app, req).await;
    assert!(feed["posts"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_like_toggle_and_comment() {
    let state = state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;
    let ada = user("Ada Lovelace", "ada@example.com");
    let bob = user("Bob", "bob@example.com");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, &ada))
        .set_json(new_post("sunset", 1))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = created["id"].as_str().unwrap();

    for expected in [true, false, true] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{post_id}/like"))
            .insert_header(bearer(&state, &bob))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["liked"], expected);
    }

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{post_id}/comments"))
        .insert_header(bearer(&state, &bob))
        .set_json(json!({"comment": "  lovely  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header(bearer(&state, &bob))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["likeCount"], 1);
    assert_eq!(detail["hasLiked"], true);
    assert_eq!(detail["commentCount"], 1);
    assert_eq!(detail["comments"][0]["comment"], "lovely");
}

#[actix_web::test]
async fn test_missing_post_is_not_found() {
    let state = state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;
    let bob = user("Bob", "bob@example.com");

    let req = test::TestRequest::get().uri("/api/posts/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/posts/nope/like")
        .insert_header(bearer(&state, &bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_own_profile_created_on_visit() {
    let state = state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;
    let ada = user("Ada Lovelace", "ada@example.com");

    let req = test::TestRequest::get()
        .uri("/api/profiles/ada@example.com")
        .insert_header(bearer(&state, &ada))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["isOwnProfile"], true);
    assert_eq!(profile["bioDisplay"], "No bio yet");
    assert_eq!(profile["profile"]["followers"], json!([]));
    assert_eq!(profile["postCount"], 0);
}

#[actix_web::test]
async fn test_profile_update_only_by_owner() {
    let state = state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;
    let ada = user("Ada Lovelace", "ada@example.com");
    let bob = user("Bob", "bob@example.com");

    let req = test::TestRequest::put()
        .uri("/api/profiles/ada@example.com")
        .insert_header(bearer(&state, &bob))
        .set_json(json!({"bio": "hacked"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/api/profiles/ada@example.com")
        .insert_header(bearer(&state, &ada))
        .set_json(json!({"bio": "Analyst", "image": PNG}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["bio"], "Analyst");
    assert!(
        body["profileImage"]
            .as_str()
            .unwrap()
            .starts_with("http://pixgram.test/media/users/ada@example.com/profile")
    );
}

#[actix_web::test]
async fn test_stories_put_viewer_first() {
    let state = state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;
    let ada = user("Ada Lovelace", "ada@example.com");
    let bob = user("Bob", "bob@example.com");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&state, &bob))
        .set_json(new_post("hi", 1))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/stories")
        .insert_header(bearer(&state, &ada))
        .to_request();
    let strip: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(strip[0]["username"], "adalovelace");
    assert_eq!(strip[0]["isViewer"], true);
    assert_eq!(strip[1]["username"], "bob");
}

#[actix_web::test]
async fn test_feed_stream_starts_with_current_state() {
    let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/posts/live").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let mut body = pin!(resp.into_body());
    let chunk = poll_fn(|cx| body.as_mut().poll_next(cx))
        .await
        .unwrap()
        .unwrap();
    let text = std::str::from_utf8(&chunk).unwrap();
    assert!(text.starts_with("event: feed\ndata: "));
    assert!(text.contains("\"loaded\":true"));
}
