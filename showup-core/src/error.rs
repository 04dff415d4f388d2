//! Error types for showup.

use thiserror::Error;

/// Errors returned when a link's query parameters can't be turned into an Event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Malformed date/time '{0}'. Expected ISO-8601 (e.g. 2025-03-20T15:00:00Z)")]
    MalformedDateTime(String),
}

/// Errors that prevent reminders from being scheduled at all.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("This event has already passed")]
    EventAlreadyPassed,

    #[error("Notification permission is required to set reminders")]
    PermissionDenied,
}

/// Errors reported by a notification dispatcher for a single reminder.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Dispatcher rejected reminder: {0}")]
    Rejected(String),
}

/// Errors that can occur in showup operations.
#[derive(Error, Debug)]
pub enum ShowUpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid link: {0}")]
    InvalidLink(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for showup operations.
pub type ShowUpResult<T> = Result<T, ShowUpError>;
