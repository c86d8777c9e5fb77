//! Document store implementations.

mod memory;

pub use memory::InMemoryDocumentStore;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub use postgres::{DatabaseConfig, PostgresDocumentStore};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;

use pixgram_core::paths::DocumentPath;
use pixgram_core::ports::ChangeFeed;

/// Announce a write to live queries on the document's collection.
///
/// The write has already happened, so a feed failure is logged rather than
/// returned.
pub(crate) async fn notify(feed: &dyn ChangeFeed, path: &DocumentPath) {
    let collection = path.parent();
    if let Err(e) = feed.publish(collection.as_str(), path.as_str()).await {
        tracing::error!(
            collection = %collection,
            path = %path,
            error = %e,
            "Failed to publish change"
        );
    }
}

/// Store-assigned document id.
pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
