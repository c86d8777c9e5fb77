//! Server-sent event streams over view state.

use std::convert::Infallible;

use actix_web::{HttpResponse, http::header, web::Bytes};
use futures::stream;
use serde::Serialize;
use tokio::sync::watch;

fn frame<T: Serialize>(event: &str, state: &T) -> Bytes {
    match serde_json::to_string(state) {
        Ok(data) => Bytes::from(format!("event: {event}\ndata: {data}\n\n")),
        Err(e) => {
            tracing::error!(event, error = %e, "Failed to encode event");
            Bytes::from_static(b"event: error\ndata: {}\n\n")
        }
    }
}

/// Stream the current state, then every change, until the client goes away
/// or the view stops publishing. `view` is held for the stream's lifetime so
/// its live queries end with the connection.
pub fn stream<T, V>(event: &'static str, rx: watch::Receiver<T>, view: V) -> HttpResponse
where
    T: Serialize + 'static,
    V: 'static,
{
    let events = stream::unfold((rx, view, true), move |(mut rx, view, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let bytes = frame(event, &*rx.borrow_and_update());
        Some((Ok::<_, Infallible>(bytes), (rx, view, false)))
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(events)
}
