//! # Pixgram Shared
//!
//! Wire types shared between the server and its clients.
//! Kept free of server dependencies so it also compiles for WASM.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
