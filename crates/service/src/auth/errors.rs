use thiserror::Error;

/// Reasons a caller is turned away. All of them surface as 401.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing session token")]
    MissingToken,
    #[error("invalid session token: {0}")]
    InvalidToken(String),
    #[error("admin role required")]
    NotAdmin,
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::MissingToken => 1001,
            AuthError::InvalidToken(_) => 1002,
            AuthError::NotAdmin => 1003,
            AuthError::Repository(_) => 1200,
        }
    }
}
