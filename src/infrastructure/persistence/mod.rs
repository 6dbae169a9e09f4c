//! PostgreSQL repository implementations.
//!
//! Queries are built at runtime with `sqlx::query_as` and `QueryBuilder`, binding every
//! user-supplied value. Rows decode into private `*Row` structs and convert into domain
//! entities.
//!
//! - [`PgShortLinkRepository`] - links, visit counters, listings
//! - [`PgClickRepository`] - click log
//! - [`PgUserRepository`] - users
//! - [`PgTokenRepository`] - API tokens

pub mod pg_click_repository;
pub mod pg_short_link_repository;
pub mod pg_token_repository;
pub mod pg_user_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_short_link_repository::PgShortLinkRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_user_repository::PgUserRepository;
