use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn storage(e: impl std::fmt::Display) -> Self { Self::Storage(e.to_string()) }

    /// Client-side fault (maps to 400 at the HTTP boundary)
    pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }
}
