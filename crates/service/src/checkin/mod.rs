//! Check-in module: per-user state plus the shared item list, persisted as one document.
//!
//! Layered like the rest of the crate: domain types, a repository seam, and a
//! framework-independent service on top.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{Document, UserId, UserState, UserUpdate};
pub use service::CheckinService;
