//! REST API layer for HTTP request/response handling.
//!
//! Translates HTTP requests into service calls and service results into JSON.
//!
//! # Modules
//!
//! - [`dto`] - request and response shapes
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - authentication, rate limiting and tracing
//! - [`routes`] - `/api` route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
