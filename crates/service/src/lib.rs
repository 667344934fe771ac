//! Service layer for the check-in tracker.
//! - Owns the on-disk JSON document and serializes access to it.
//! - Keeps business rules (payload split, default user state) out of the web layer.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod storage;
pub mod checkin;
pub mod file;
