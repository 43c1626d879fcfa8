//! Error types for need
//!
//! Exit codes:
//! - 0: Success
//! - 1: Handled failure (bad input, config I/O, tracker failure)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the need binaries
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

/// Main error type for need operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid priority level: {0}")]
    InvalidPriority(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Config store failures
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    // Tracker failures
    #[error("Tracker not available: {0}")]
    TrackerUnavailable(String),

    #[error("Tracker command failed: {0}")]
    TrackerFailed(String),

    #[error("Tracker command timed out after {0} ms")]
    TrackerTimeout(u64),

    #[error("Error defining context: {0}")]
    ContextDefinition(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        exit_codes::FAILURE
    }

    /// Short machine-readable category used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnknownCommand(_)
            | Error::InvalidArgument(_)
            | Error::InvalidPriority(_)
            | Error::InvalidConfig(_) => "user_error",
            Error::ConfigNotFound(_) | Error::Io(_) | Error::LockFailed(_) => "config_error",
            Error::TrackerUnavailable(_)
            | Error::TrackerFailed(_)
            | Error::TrackerTimeout(_)
            | Error::ContextDefinition(_)
            | Error::Json(_) => "tracker_error",
        }
    }
}

/// Result type alias for need operations
pub type Result<T> = std::result::Result<T, Error>;
