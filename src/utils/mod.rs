//! Helpers shared across layers.
//!
//! - [`slug_codec`] - slug sanitization, validation and random generation
//! - [`url_normalizer`] - scheme completion and URL validation
//! - [`client_info`] - visitor metadata extraction from request headers
//! - [`db_error`] - classification of database constraint violations

pub mod client_info;
pub mod db_error;
pub mod slug_codec;
pub mod url_normalizer;
