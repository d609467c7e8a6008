//! Domain error types
//!
//! Validation failures of user-supplied values.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Synchronization interval is not a positive number of seconds
    #[error("Invalid sync interval: {0}")]
    InvalidInterval(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidInterval("must be greater than 0, got -3".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid sync interval: must be greater than 0, got -3"
        );
    }
}
