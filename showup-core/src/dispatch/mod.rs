//! Capabilities the scheduler relies on but doesn't own.
//!
//! Notification delivery and the permission to deliver belong to whatever
//! host runs the scheduler (an OS notification center, a desktop notifier,
//! a test fake). They are injected, never looked up globally.

mod file;

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::reminder::ScheduledReminder;

pub use file::FileDispatcher;

/// Reports and requests permission to show notifications.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn has_permission(&self) -> bool;

    /// Ask for permission; returns whether it is now granted.
    async fn request_permission(&self) -> bool;
}

/// Timer-backed delivery of reminders.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Schedule a reminder, replacing any pending one with the same id.
    async fn schedule(&self, reminder: ScheduledReminder) -> Result<(), DispatchError>;

    /// Cancel pending reminders. Unknown ids are ignored and failures are
    /// the dispatcher's to handle; cancelling never errors.
    async fn cancel(&self, ids: &[String]);

    /// Best-effort view of reminders that have not fired yet.
    async fn pending(&self) -> Vec<ScheduledReminder>;
}
