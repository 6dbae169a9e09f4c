//! Infrastructure layer: concrete implementations of the domain repository traits.
//!
//! - [`persistence`] - PostgreSQL repositories
//! - [`memory`] - in-process store with the same uniqueness guarantees
//! - [`bounded`] - per-call timeout decorator

pub mod bounded;
pub mod memory;
pub mod persistence;
