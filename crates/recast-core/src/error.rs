//! Error types for recast operations
//!
//! Ineligible refactoring targets and unresolved semantic queries are not
//! errors: they surface as empty results. Errors here are contract violations
//! and environment failures.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for recast operations
#[derive(Debug, Error)]
pub enum RecastError {
    /// A caller broke an operation's contract (wrong node kind, missing child)
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A node was used with a tree value it does not belong to
    #[error("Stale node: {message}")]
    StaleNode { message: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The host withdrew the request before the transform started
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    StaleNode,
    Config,
    Io,
    Cancelled,
}

impl RecastError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecastError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            RecastError::StaleNode { .. } => ErrorKind::StaleNode,
            RecastError::ConfigError { .. } => ErrorKind::Config,
            RecastError::IoError { .. } => ErrorKind::Io,
            RecastError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Check if this error is recoverable (processing of other documents can
    /// continue)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidArgument | ErrorKind::StaleNode)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn stale_node(message: impl Into<String>) -> Self {
        Self::StaleNode {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }
}

impl From<std::io::Error> for RecastError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for RecastError {
    fn from(err: serde_json::Error) -> Self {
        Self::config_error(format!("JSON error: {err}"))
    }
}

impl From<json5::Error> for RecastError {
    fn from(err: json5::Error) -> Self {
        Self::config_error(format!("JSON5 error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            RecastError::invalid_argument("not a switch").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(RecastError::cancelled("apply").kind(), ErrorKind::Cancelled);
        assert_eq!(
            RecastError::io_error("x", std::io::Error::other("boom")).kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn test_recoverability() {
        assert!(RecastError::stale_node("node from another tree").is_recoverable());
        assert!(RecastError::invalid_argument("not a switch").is_recoverable());
        assert!(!RecastError::config_error("bad").is_recoverable());
        assert!(!RecastError::cancelled("apply").is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = RecastError::invalid_argument("expected SwitchStmt, found IfStmt");
        assert_eq!(
            err.to_string(),
            "Invalid argument: expected SwitchStmt, found IfStmt"
        );
    }
}
