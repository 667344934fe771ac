//! File-backed implementations of the domain repositories.

pub mod checkin_store;
