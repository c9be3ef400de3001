//! Error types for Dialorder services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DialorderError>;

#[derive(Error, Debug)]
pub enum DialorderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DialorderError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Unavailable(_) => 503,
            _ => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Provider(_) => "PROVIDER_ERROR",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<std::io::Error> for DialorderError {
    fn from(err: std::io::Error) -> Self {
        DialorderError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for DialorderError {
    fn from(err: serde_json::Error) -> Self {
        DialorderError::Validation(format!("Invalid JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(DialorderError::Validation("x".into()).status_code(), 400);
        assert_eq!(DialorderError::NotFound("x".into()).status_code(), 404);
        assert_eq!(DialorderError::Provider("x".into()).status_code(), 500);
        assert_eq!(DialorderError::Storage("x".into()).status_code(), 500);
    }
}
