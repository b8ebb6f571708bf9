//! Error types for `ChillMCP`
//!
//! The state core itself never fails; errors come from configuration
//! validation, the stdio transport, and the optional HTTP listeners.

use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `ChillMCP` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (out-of-range or malformed runtime settings)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (bind failure, stdio closed unexpectedly)
    pub const IO_ERROR: i32 = 3;

    /// Transport error (stdio failure, listener bind failed)
    pub const TRANSPORT_ERROR: i32 = 4;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `ChillMCP` operations.
///
/// Aggregates the domain-specific errors and maps each one to an exit code.
#[derive(Debug, Error)]
pub enum ChillError {
    /// Runtime configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transport layer error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChillError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Transport(_) => ExitCode::TRANSPORT_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Runtime configuration errors.
///
/// Out-of-range values are rejected rather than clamped, so a caller bug
/// surfaces at startup instead of silently changing behavior.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Transport Errors
// ============================================================================

/// Transport layer errors for stdio and the HTTP listeners.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error during transport operations
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to establish a listener or connection
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `ChillMCP` operations.
pub type Result<T> = std::result::Result<T, ChillError>;

// ============================================================================
// Tests
// ============================================================================
