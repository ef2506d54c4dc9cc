//! Shared building blocks for Conduit crates

#![allow(clippy::must_use_candidate)]

mod error;
pub mod headers;

pub use error::HttpError;
pub use headers::sanitize_forwarded_headers;
