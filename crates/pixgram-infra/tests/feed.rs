mod common;

use common::{Fixture, ada, bob, draft, within};
use pixgram_core::document::{Fields, server_timestamp};
use pixgram_core::paths;
use pixgram_core::services::UploadSequencer;
use pixgram_core::views::{FeedView, stories};
use serde_json::json;

fn legacy_post(email: &str) -> Fields {
    let value = json!({
        "username": "legacy",
        "email": email,
        "caption": "from the old days",
        "image": "https://cdn.test/legacy.png",
        "timestamp": server_timestamp(),
    });
    match value {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_feed_is_newest_first_with_display_fallback() {
    let fx = Fixture::new();
    fx.store.add(&paths::posts(), legacy_post("old@example.com")).await.unwrap();
    let newest = UploadSequencer::new(fx.store.clone(), fx.blob_store())
        .upload_post(&ada(), draft("carousel", 2))
        .await
        .unwrap();

    let mut feed = FeedView::mount(fx.store.clone()).await.unwrap();
    let state = within(feed.wait_until(|s| s.posts.len() == 2)).await;

    assert_eq!(state.posts[0].id, newest);
    assert_eq!(state.posts[0].image.as_ref(), state.posts[0].images.first());
    assert_eq!(state.posts[1].image.as_deref(), Some("https://cdn.test/legacy.png"));
    assert_eq!(state.posts[1].images, vec!["https://cdn.test/legacy.png"]);
}

#[tokio::test]
async fn test_feed_receives_new_posts() {
    let fx = Fixture::new();
    let mut feed = FeedView::mount(fx.store.clone()).await.unwrap();
    assert!(within(feed.loaded()).await.posts.is_empty());

    UploadSequencer::new(fx.store.clone(), fx.blob_store())
        .upload_post(&bob(), draft("hi", 1))
        .await
        .unwrap();

    let state = within(feed.wait_until(|s| s.posts.len() == 1)).await;
    assert_eq!(state.posts[0].username, "bob");
}

#[tokio::test]
async fn test_remount_reproduces_feed() {
    let fx = Fixture::new();
    let uploads = UploadSequencer::new(fx.store.clone(), fx.blob_store());
    uploads.upload_post(&ada(), draft("a", 1)).await.unwrap();
    uploads.upload_post(&bob(), draft("b", 1)).await.unwrap();

    let mut first = FeedView::mount(fx.store.clone()).await.unwrap();
    let before = within(first.wait_until(|s| s.posts.len() == 2)).await;
    first.unmount();

    let mut second = FeedView::mount(fx.store.clone()).await.unwrap();
    let after = within(second.wait_until(|s| s.posts.len() == 2)).await;
    assert_eq!(before, after);
    assert_eq!(after, FeedView::load(fx.store.as_ref()).await.unwrap());
}

#[tokio::test]
async fn test_stories_lead_with_viewer() {
    let fx = Fixture::new();
    let uploads = UploadSequencer::new(fx.store.clone(), fx.blob_store());
    uploads.upload_post(&bob(), draft("b1", 1)).await.unwrap();
    uploads.upload_post(&ada(), draft("a1", 1)).await.unwrap();
    uploads.upload_post(&bob(), draft("b2", 1)).await.unwrap();

    let feed = FeedView::load(fx.store.as_ref()).await.unwrap();
    let strip = stories(Some(&ada()), &feed);

    let names: Vec<&str> = strip.iter().map(|s| s.username.as_str()).collect();
    assert_eq!(names, vec!["adalovelace", "bob"]);
    assert!(strip[0].is_viewer);
}
