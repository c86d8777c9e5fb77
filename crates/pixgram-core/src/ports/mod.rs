//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod blob;
mod change_feed;
mod store;

pub use auth::{AuthError, IdentityVerifier, IssuedToken, SessionTokenService};
pub use blob::{BlobError, BlobPayload, BlobStore, DecodedBlob, StoredBlob, sniff_content_type};
pub use change_feed::{ChangeFeed, ChangeFeedError, ChangeStream};
pub use store::{DocumentStore, Subscription};
