//! Error types for the bat service.

/// Top-level error type for the event tracker.
#[derive(Debug, thiserror::Error)]
pub enum BatError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Backing store error.
    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),

    /// Password hashing or token error.
    #[error("auth error: {0}")]
    Auth(#[from] crate::auth::AuthError),

    /// HTTP server error (bind, serve).
    #[error("server error: {0}")]
    Server(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BatError>;
