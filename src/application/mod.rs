//! Application layer services implementing business logic.
//!
//! Services are generic over repository traits and are handed `Arc<dyn Trait>` in
//! production, mocks or the in-memory store in tests.
//!
//! # Available Services
//!
//! - [`services::slug_allocator::SlugAllocator`] - unique slug allocation
//! - [`services::link_service::LinkService`] - link create/read/update/delete/list
//! - [`services::redirect_service::RedirectResolver`] - slug resolution and visit recording
//! - [`services::stats_service::StatsService`] - link analytics and owner dashboard
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
