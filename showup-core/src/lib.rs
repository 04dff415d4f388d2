//! Core types for showup.
//!
//! This crate provides everything shared by the `showup` CLI and the
//! `showup-notify` service:
//! - `Event` and the `link` codec that carries an event in a URL
//! - `ReminderScheduler`, which manages the reminders tied to an event
//! - the `dispatch` capabilities it depends on, plus a file-backed dispatcher
//! - `Attendance`, the confirm/decline flow built on top

pub mod attendance;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod link;
pub mod reminder;
pub mod scheduler;

// Re-export the most used types at crate root for convenience
pub use error::{DecodeError, DispatchError, SchedulingError, ShowUpError, ShowUpResult};
pub use event::{Event, EventType};
pub use reminder::{ReminderKind, ReminderPayload, ScheduledReminder};
pub use scheduler::{ReminderScheduler, ScheduleReport};
