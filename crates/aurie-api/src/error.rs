//! Interface error types

use std::fmt;

/// Error reported by an interface object's own lifecycle routines
#[derive(Debug, thiserror::Error)]
pub enum InterfaceError {
    /// Creation failed
    #[error("Interface creation failed: {0}")]
    CreateError(String),

    /// A capability this interface relies on is missing
    #[error("Dependency missing: {0}")]
    DependencyMissing(String),
}

/// Result type for interface operations
pub type Result<T> = std::result::Result<T, InterfaceError>;

impl InterfaceError {
    /// Create a new creation error
    pub fn create(msg: impl fmt::Display) -> Self {
        Self::CreateError(msg.to_string())
    }

    /// Create a new dependency missing error
    pub fn dependency(name: impl fmt::Display) -> Self {
        Self::DependencyMissing(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = InterfaceError::create("test");
        assert!(matches!(err, InterfaceError::CreateError(_)));

        let err = InterfaceError::dependency("net");
        assert!(matches!(err, InterfaceError::DependencyMissing(_)));
    }

    #[test]
    fn test_error_display() {
        let err = InterfaceError::CreateError("socket refused".to_string());
        assert_eq!(err.to_string(), "Interface creation failed: socket refused");
    }
}
