//! Domain layer: entities, repository contracts and click processing.
//!
//! The domain layer has no dependency on HTTP or SQL. Business logic lives in
//! [`crate::application::services`].
//!
//! # Click Processing Flow
//!
//! 1. A redirect resolves and builds a [`click_event::ClickEvent`]
//! 2. The event is pushed onto a bounded channel without waiting
//! 3. [`click_worker::run_click_worker`] persists it with retry
//! 4. Clicks land in [`repositories::ClickRepository`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
