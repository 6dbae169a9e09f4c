//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod redirect_service;
pub mod slug_allocator;
pub mod stats_service;

pub use auth_service::AuthService;
pub use link_service::{CreateLink, LinkService, ListLinks, UpdateLink};
pub use redirect_service::RedirectResolver;
pub use slug_allocator::SlugAllocator;
pub use stats_service::{LinkAnalytics, StatsService};
