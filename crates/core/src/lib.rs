//! `shopdesk-core`: shared building blocks for the dashboard crates.
//!
//! This crate contains **pure** primitives (no I/O, no async).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
