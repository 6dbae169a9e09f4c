//! Core domain entities.
//!
//! Entities are plain data. Creation uses a separate `New*` struct and partial updates a
//! `*Patch` struct:
//!
//! - [`ShortLink`] / [`NewShortLink`] / [`ShortLinkPatch`] - slug to URL mapping
//! - [`Click`] / [`NewClick`] - recorded redirects
//! - [`User`] - link owner
//! - [`Page`] - paginated result wrapper

pub mod click;
pub mod page;
pub mod short_link;
pub mod user;

pub use click::{Click, NewClick};
pub use page::Page;
pub use short_link::{NewShortLink, ShortLink, ShortLinkPatch};
pub use user::User;
