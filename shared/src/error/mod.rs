use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The row store refused the write. Carries the store's own message.
    #[error("{0}")]
    StoreRejected(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

// Helper function to map errors raised while talking to a Supabase endpoint
pub fn map_supabase_error<E: std::fmt::Display>(operation: &str, err: E) -> ServiceError {
    ServiceError::Transport(format!("Supabase {} error: {}", operation, err))
}
