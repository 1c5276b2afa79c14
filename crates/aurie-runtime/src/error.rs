//! Object manager error types

use aurie_api::{InterfaceError, ModuleId};
use std::fmt;

/// Object manager error type
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// An interface with this name is already published
    #[error("Interface already exists: {0}")]
    AlreadyExists(String),

    /// No module owns an interface with this name
    #[error("Interface not found: {0}")]
    NotFound(String),

    /// A module tried to destroy an interface it does not own
    #[error("Access denied: {requester} may not destroy '{interface}' owned by {owner}")]
    AccessDenied {
        /// Interface name
        interface: String,
        /// Module that asked
        requester: ModuleId,
        /// Module that owns the interface
        owner: ModuleId,
    },

    /// The interface's own `create` failed; carried through unchanged
    #[error(transparent)]
    CreationFailed(#[from] InterfaceError),

    /// Module is not registered
    #[error("Module not found: {0}")]
    ModuleNotFound(ModuleId),

    /// Interface exists but has a different concrete type
    #[error("Interface '{name}' is not a {expected}")]
    TypeMismatch {
        /// Interface name
        name: String,
        /// Requested type
        expected: &'static str,
    },

    /// Invalid state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for object manager operations
pub type Result<T> = std::result::Result<T, ObjectError>;

impl ObjectError {
    /// Create a new already exists error
    pub fn already_exists(name: impl fmt::Display) -> Self {
        Self::AlreadyExists(name.to_string())
    }

    /// Create a new not found error
    pub fn not_found(name: impl fmt::Display) -> Self {
        Self::NotFound(name.to_string())
    }

    /// Create a new access denied error
    pub fn access_denied(interface: impl fmt::Display, requester: ModuleId, owner: ModuleId) -> Self {
        Self::AccessDenied {
            interface: interface.to_string(),
            requester,
            owner,
        }
    }

    /// Create a new invalid state error
    pub fn invalid_state(msg: impl fmt::Display) -> Self {
        Self::InvalidState(msg.to_string())
    }

    /// Create a new config error
    pub fn config(msg: impl fmt::Display) -> Self {
        Self::ConfigError(msg.to_string())
    }

    /// True for [`ObjectError::NotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ObjectError::not_found("Net");
        assert!(err.is_not_found());

        let err = ObjectError::already_exists("Net");
        assert!(matches!(err, ObjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ObjectError::NotFound("Net".to_string());
        assert_eq!(err.to_string(), "Interface not found: Net");

        let err = ObjectError::access_denied("Net", ModuleId::from_raw(2), ModuleId::from_raw(1));
        assert_eq!(
            err.to_string(),
            "Access denied: module#2 may not destroy 'Net' owned by module#1"
        );
    }

    #[test]
    fn test_creation_failure_is_transparent() {
        let inner = InterfaceError::create("no socket");
        let expected = inner.to_string();

        let err: ObjectError = inner.into();
        assert_eq!(err.to_string(), expected);
        assert!(matches!(
            err,
            ObjectError::CreationFailed(InterfaceError::CreateError(_))
        ));
    }
}
