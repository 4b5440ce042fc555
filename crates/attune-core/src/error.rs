//! Error types for Attune
//!
//! Runtime degradation (no face, stale callbacks, resizes) is never an
//! error. These cover configuration mistakes and API misuse only.

use thiserror::Error;

/// Core Attune errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttuneError {
    // Configuration errors
    #[error("Cycle has no states")]
    EmptyCycle,

    #[error("State {state} has a zero duration")]
    InvalidDuration { state: String },

    #[error("Invalid threshold for {name}: {value}")]
    InvalidThreshold { name: String, value: f32 },

    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    // Session errors
    #[error("Session is still active")]
    SessionActive,

    #[error("Session has ended")]
    SessionEnded,
}

/// Result type for Attune operations
pub type AttuneResult<T> = Result<T, AttuneError>;
