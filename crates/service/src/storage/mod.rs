//! Storage abstractions for service layer
//!
//! File-backed document persistence shared by the domain modules.

pub mod json_document_store;
