//! Core error types for TRACE.ORACLE.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Unknown log level
    InvalidLogLevel {
        /// Text that was given
        level: String,
    },

    /// Text that does not name a known value
    ParseError {
        /// What failed to parse
        message: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLogLevel { level } => write!(f, "Invalid log level: {}", level),
            Self::ParseError { message } => write!(f, "Parse error: {}", message),
        }
    }
}

impl std::error::Error for CoreError {}
