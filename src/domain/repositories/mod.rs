//! Repository trait definitions for the domain layer.
//!
//! Traits define the data access contract; implementations live in
//! `crate::infrastructure`. Mocks are generated with `mockall` for unit tests.
//!
//! - [`ShortLinkRepository`] - link persistence and atomic visit counting
//! - [`ClickRepository`] - append-only click log
//! - [`UserRepository`] - link owners
//! - [`TokenRepository`] - API token authentication

pub mod click_repository;
pub mod short_link_repository;
pub mod token_repository;
pub mod user_repository;

pub use click_repository::ClickRepository;
pub use short_link_repository::{
    LinkListQuery, OwnerSummary, ShortLinkRepository, SortField, SortOrder,
};
pub use token_repository::{ApiToken, TokenOwner, TokenRepository};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use short_link_repository::MockShortLinkRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
