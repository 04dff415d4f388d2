//! A recipient's response to an invitation.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::dispatch::{NotificationDispatcher, PermissionGate};
use crate::error::SchedulingError;
use crate::event::Event;
use crate::scheduler::{ReminderScheduler, ScheduleReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Pending,
    Confirmed,
    Declined,
    Late,
}

impl AttendanceStatus {
    pub fn message(&self) -> &'static str {
        match self {
            AttendanceStatus::Pending => "Tap to confirm your attendance",
            AttendanceStatus::Confirmed => "You're confirmed! We'll remind you.",
            AttendanceStatus::Declined => "Attendance cancelled",
            AttendanceStatus::Late => "Running late - host notified",
        }
    }
}

/// Result of confirming attendance.
///
/// Attendance is confirmed even when reminders couldn't be set; `reminders`
/// says what happened to them.
#[derive(Debug)]
pub struct Confirmation {
    pub reminders: Result<ScheduleReport, SchedulingError>,
}

impl Confirmation {
    pub fn reminders_set(&self) -> usize {
        self.reminders.as_ref().map_or(0, ScheduleReport::scheduled_count)
    }
}

#[derive(Debug, Clone)]
pub struct Attendance {
    pub event: Event,
    pub status: AttendanceStatus,
}

impl Attendance {
    pub fn new(event: Event) -> Self {
        Attendance {
            event,
            status: AttendanceStatus::Pending,
        }
    }

    pub fn can_confirm(&self, now: DateTime<Utc>) -> bool {
        self.event.is_upcoming(now) && self.status != AttendanceStatus::Confirmed
    }

    pub fn status_message(&self) -> &'static str {
        self.status.message()
    }

    /// Confirm attendance and try to set reminders.
    ///
    /// Asks for notification permission when it hasn't been granted. Fails
    /// only when the event has already passed.
    pub async fn confirm<P, D>(
        &mut self,
        scheduler: &ReminderScheduler<P, D>,
        now: DateTime<Utc>,
    ) -> Result<Confirmation, SchedulingError>
    where
        P: PermissionGate,
        D: NotificationDispatcher,
    {
        if !self.event.is_upcoming(now) {
            return Err(SchedulingError::EventAlreadyPassed);
        }

        info!(event_id = %self.event.id, "Confirming attendance for: {}", self.event.title);

        let permission = scheduler.permission();
        if !permission.has_permission().await && !permission.request_permission().await {
            warn!(event_id = %self.event.id, "Notification permission declined, confirming without reminders");
        }

        let reminders = scheduler.schedule(&self.event, now).await;
        self.status = AttendanceStatus::Confirmed;

        Ok(Confirmation { reminders })
    }

    /// Decline attendance and drop any reminders.
    pub async fn decline<P, D>(&mut self, scheduler: &ReminderScheduler<P, D>)
    where
        P: PermissionGate,
        D: NotificationDispatcher,
    {
        scheduler.cancel(&self.event).await;
        self.status = AttendanceStatus::Declined;
        info!(event_id = %self.event.id, "Declined attendance for: {}", self.event.title);
    }

    pub fn mark_running_late(&mut self) {
        self.status = AttendanceStatus::Late;
        info!(event_id = %self.event.id, "Marked as running late");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tests::{FakeDispatcher, FakePermission, event_in, make_scheduler, now};
    use chrono::Duration;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn confirm_requests_missing_permission_then_schedules() {
        let scheduler = make_scheduler(FakePermission::new(false, true), FakeDispatcher::default());
        let mut attendance = Attendance::new(event_in(Duration::days(2)));

        let confirmation = attendance.confirm(&scheduler, now()).await.unwrap();

        assert_eq!(scheduler.permission().requests.load(Ordering::SeqCst), 1);
        assert_eq!(confirmation.reminders_set(), 3);
        assert_eq!(attendance.status, AttendanceStatus::Confirmed);
    }

    #[tokio::test]
    async fn confirm_does_not_ask_when_already_granted() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default());
        let mut attendance = Attendance::new(event_in(Duration::days(2)));

        attendance.confirm(&scheduler, now()).await.unwrap();

        assert_eq!(scheduler.permission().requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn denied_permission_still_confirms() {
        let scheduler = make_scheduler(FakePermission::denied(), FakeDispatcher::default());
        let mut attendance = Attendance::new(event_in(Duration::days(2)));

        let confirmation = attendance.confirm(&scheduler, now()).await.unwrap();

        assert!(matches!(
            confirmation.reminders,
            Err(SchedulingError::PermissionDenied)
        ));
        assert_eq!(confirmation.reminders_set(), 0);
        assert_eq!(attendance.status, AttendanceStatus::Confirmed);
        assert_eq!(attendance.status_message(), "You're confirmed! We'll remind you.");
    }

    #[tokio::test]
    async fn past_event_cannot_be_confirmed() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default());
        let mut attendance = Attendance::new(event_in(Duration::hours(-1)));

        assert!(!attendance.can_confirm(now()));
        let err = attendance.confirm(&scheduler, now()).await.unwrap_err();

        assert_eq!(err, SchedulingError::EventAlreadyPassed);
        assert_eq!(attendance.status, AttendanceStatus::Pending);
    }

    #[tokio::test]
    async fn decline_cancels_reminders() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default());
        let mut attendance = Attendance::new(event_in(Duration::days(2)));

        attendance.confirm(&scheduler, now()).await.unwrap();
        assert!(!attendance.can_confirm(now()));
        attendance.decline(&scheduler).await;

        assert_eq!(attendance.status, AttendanceStatus::Declined);
        assert!(scheduler.dispatcher().ids().is_empty());
    }

    #[test]
    fn running_late_only_changes_status() {
        let mut attendance = Attendance::new(event_in(Duration::hours(1)));
        attendance.mark_running_late();

        assert_eq!(attendance.status, AttendanceStatus::Late);
        assert_eq!(attendance.status_message(), "Running late - host notified");
    }
}
