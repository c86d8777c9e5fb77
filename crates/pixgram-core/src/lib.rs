//! # Pixgram Core
//!
//! The domain layer of Pixgram: documents and queries, the ports every
//! adapter implements, the live-query reconciler, write services and the
//! view models the server streams to browsers.

pub mod clock;
pub mod document;
pub mod domain;
pub mod error;
pub mod live;
pub mod paths;
pub mod ports;
pub mod query;
pub mod services;
pub mod views;

pub use clock::ServerClock;
pub use document::{Document, Fields, Snapshot};
pub use error::{DomainError, StoreError};
pub use live::Disposer;
pub use query::Query;
