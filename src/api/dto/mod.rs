//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs only deserialize; field rules are enforced by the service inputs they convert
//! into, so every entry point validates the same way. Request fields accept both `snake_case`
//! and the `camelCase` spelling used by browser clients.

pub mod health;
pub mod links;
pub mod pagination;
pub mod stats;
