//! Error types for JobSafe
//!
//! Only construction-time work can fail: parsing symbols from text,
//! compiling rule tables, and loading classifier configuration.
//! Classification and validation themselves are total.

use thiserror::Error;

/// JobSafe error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Text that does not name a contract section symbol
    #[error("Unknown symbol: '{0}' (expected one of H, R, D, S, C, B, F, T, X)")]
    UnknownSymbol(String),

    /// A rule pattern that failed to compile
    #[error("Invalid pattern for {symbol} - '{pattern}': {reason}")]
    InvalidPattern {
        symbol: String,
        pattern: String,
        reason: String,
    },

    /// Malformed or inconsistent classifier configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for JobSafe operations
pub type Result<T> = std::result::Result<T, Error>;
