//! Reminder scheduling for a single event.
//!
//! Each event owns at most one set of reminders, addressed by deterministic
//! identifiers (`<namespace>.<event-id>.<tag>`). Scheduling always cancels
//! that set first, so calling `schedule` again replaces rather than
//! duplicates, and no bookkeeping is needed to find an event's reminders
//! after a restart.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};
use url::Url;

use crate::dispatch::{NotificationDispatcher, PermissionGate};
use crate::error::{DispatchError, SchedulingError};
use crate::event::Event;
use crate::reminder::{
    ReminderKind, ReminderPayload, ScheduledReminder, notification_id, notification_ids,
};

/// Namespace used for notification identifiers unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "showupbooster";

/// Outcome of scheduling one event's reminders.
///
/// Kinds are evaluated independently: a dispatcher failure for one kind
/// doesn't undo the kinds already accepted.
#[derive(Debug, Default)]
pub struct ScheduleReport {
    pub scheduled: Vec<ReminderKind>,
    /// Kinds whose fire time had already passed
    pub skipped: Vec<ReminderKind>,
    pub failed: Vec<(ReminderKind, DispatchError)>,
}

impl ScheduleReport {
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct ReminderScheduler<P, D> {
    permission: P,
    dispatcher: D,
    link_base: Url,
    namespace: String,
    tz: Tz,
}

impl<P: PermissionGate, D: NotificationDispatcher> ReminderScheduler<P, D> {
    pub fn new(permission: P, dispatcher: D, link_base: Url) -> Self {
        ReminderScheduler {
            permission,
            dispatcher,
            link_base,
            namespace: DEFAULT_NAMESPACE.to_string(),
            tz: Tz::UTC,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Zone used to print event times in reminder text.
    pub fn with_time_zone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    pub fn permission(&self) -> &P {
        &self.permission
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn reminder_id(&self, event: &Event, kind: ReminderKind) -> String {
        notification_id(&self.namespace, &event.id, kind)
    }

    /// Build the reminder for `kind`, or `None` when its fire time is not
    /// strictly after `now`.
    pub fn plan(&self, event: &Event, kind: ReminderKind, now: DateTime<Utc>) -> Option<ScheduledReminder> {
        let fire_at = kind.fire_time(event);
        if fire_at <= now {
            return None;
        }

        Some(ScheduledReminder {
            id: self.reminder_id(event, kind),
            event_id: event.id,
            kind,
            fire_at,
            payload: ReminderPayload::new(kind, event, &self.link_base, &self.tz),
        })
    }

    /// Replace the event's reminders with every reminder still ahead of `now`.
    pub async fn schedule(
        &self,
        event: &Event,
        now: DateTime<Utc>,
    ) -> Result<ScheduleReport, SchedulingError> {
        if !event.is_upcoming(now) {
            debug!(event_id = %event.id, "Not scheduling reminders for past event");
            return Err(SchedulingError::EventAlreadyPassed);
        }

        if !self.permission.has_permission().await {
            warn!(event_id = %event.id, "Cannot schedule reminders without permission");
            return Err(SchedulingError::PermissionDenied);
        }

        // Must complete before scheduling so at most one set is ever active
        self.cancel(event).await;

        let mut report = ScheduleReport::default();

        for kind in ReminderKind::ALL {
            let Some(reminder) = self.plan(event, kind, now) else {
                report.skipped.push(kind);
                continue;
            };

            let fire_at = reminder.fire_at;
            match self.dispatcher.schedule(reminder).await {
                Ok(()) => {
                    debug!(event_id = %event.id, %kind, %fire_at, "Scheduled reminder");
                    report.scheduled.push(kind);
                }
                Err(e) => {
                    warn!(event_id = %event.id, %kind, "Failed to schedule reminder: {}", e);
                    report.failed.push((kind, e));
                }
            }
        }

        info!(
            event_id = %event.id,
            scheduled = report.scheduled_count(),
            "Scheduled reminder(s) for: {}",
            event.title
        );

        Ok(report)
    }

    /// Cancel every reminder the event could have. Never fails.
    pub async fn cancel(&self, event: &Event) {
        let ids = notification_ids(&self.namespace, &event.id);
        self.dispatcher.cancel(&ids).await;
        debug!(event_id = %event.id, "Cancelled reminders for: {}", event.title);
    }

    /// Reminders still pending for this event.
    pub async fn pending_for(&self, event: &Event) -> Vec<ScheduledReminder> {
        let ids = notification_ids(&self.namespace, &event.id);
        self.dispatcher
            .pending()
            .await
            .into_iter()
            .filter(|r| ids.contains(&r.id))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Permission gate with a fixed answer to `has_permission` and a
    /// configurable answer to `request_permission`.
    pub(crate) struct FakePermission {
        granted: AtomicBool,
        grant_on_request: bool,
        pub(crate) requests: AtomicUsize,
    }

    impl FakePermission {
        pub(crate) fn granted() -> Self {
            Self::new(true, true)
        }

        pub(crate) fn denied() -> Self {
            Self::new(false, false)
        }

        pub(crate) fn new(granted: bool, grant_on_request: bool) -> Self {
            FakePermission {
                granted: AtomicBool::new(granted),
                grant_on_request,
                requests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PermissionGate for FakePermission {
        async fn has_permission(&self) -> bool {
            self.granted.load(Ordering::SeqCst)
        }

        async fn request_permission(&self) -> bool {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if self.grant_on_request {
                self.granted.store(true, Ordering::SeqCst);
            }
            self.granted.load(Ordering::SeqCst)
        }
    }

    /// In-memory dispatcher that can be told to reject one kind.
    #[derive(Default)]
    pub(crate) struct FakeDispatcher {
        pending: Mutex<BTreeMap<String, ScheduledReminder>>,
        pub(crate) reject: Option<ReminderKind>,
        pub(crate) cancel_calls: AtomicUsize,
    }

    impl FakeDispatcher {
        pub(crate) fn ids(&self) -> Vec<String> {
            self.pending.lock().unwrap().keys().cloned().collect()
        }
    }

    #[async_trait]
    impl NotificationDispatcher for FakeDispatcher {
        async fn schedule(&self, reminder: ScheduledReminder) -> Result<(), DispatchError> {
            if self.reject == Some(reminder.kind) {
                return Err(DispatchError::Rejected("quota exceeded".to_string()));
            }
            self.pending.lock().unwrap().insert(reminder.id.clone(), reminder);
            Ok(())
        }

        async fn cancel(&self, ids: &[String]) {
            self.cancel_calls.fetch_add(1, Ordering::SeqCst);
            let mut pending = self.pending.lock().unwrap();
            for id in ids {
                pending.remove(id);
            }
        }

        async fn pending(&self) -> Vec<ScheduledReminder> {
            self.pending.lock().unwrap().values().cloned().collect()
        }
    }

    pub(crate) fn make_scheduler(
        permission: FakePermission,
        dispatcher: FakeDispatcher,
    ) -> ReminderScheduler<FakePermission, FakeDispatcher> {
        let base = Url::parse("https://imentos.github.io/ShowUpBooster/").unwrap();
        ReminderScheduler::new(permission, dispatcher, base)
    }

    pub(crate) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap()
    }

    pub(crate) fn event_in(offset: Duration) -> Event {
        Event::new("Modern Villa Open House", "123 Oak Street", now() + offset)
    }

    #[tokio::test]
    async fn schedules_all_three_for_distant_event() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default());
        let event = event_in(Duration::days(3));

        let report = scheduler.schedule(&event, now()).await.unwrap();

        assert_eq!(report.scheduled, ReminderKind::ALL.to_vec());
        assert!(report.skipped.is_empty());
        assert_eq!(scheduler.dispatcher().ids().len(), 3);
    }

    #[tokio::test]
    async fn event_seconds_away_schedules_nothing() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default());
        let event = event_in(Duration::seconds(10));

        let report = scheduler.schedule(&event, now()).await.expect("Count 0 is still success");

        assert_eq!(report.scheduled_count(), 0);
        assert_eq!(report.skipped, ReminderKind::ALL.to_vec());
        assert!(scheduler.dispatcher().ids().is_empty());
    }

    #[tokio::test]
    async fn fire_time_equal_to_now_is_excluded() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default());

        let event = event_in(Duration::hours(2));
        let report = scheduler.schedule(&event, now()).await.unwrap();
        assert!(!report.scheduled.contains(&ReminderKind::TwoHours));
        assert_eq!(report.scheduled, vec![ReminderKind::ThirtyMinutes]);

        let event = event_in(Duration::hours(2) + Duration::seconds(1));
        let report = scheduler.schedule(&event, now()).await.unwrap();
        assert_eq!(
            report.scheduled,
            vec![ReminderKind::TwoHours, ReminderKind::ThirtyMinutes]
        );
    }

    #[tokio::test]
    async fn past_event_is_rejected_without_side_effects() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default());

        for offset in [Duration::zero(), Duration::minutes(-5)] {
            let event = event_in(offset);
            let err = scheduler.schedule(&event, now()).await.unwrap_err();
            assert_eq!(err, SchedulingError::EventAlreadyPassed);
        }

        assert_eq!(scheduler.dispatcher().cancel_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_permission_is_rejected() {
        let scheduler = make_scheduler(FakePermission::denied(), FakeDispatcher::default());
        let event = event_in(Duration::days(2));

        let err = scheduler.schedule(&event, now()).await.unwrap_err();

        assert_eq!(err, SchedulingError::PermissionDenied);
        assert!(scheduler.dispatcher().ids().is_empty());
    }

    #[tokio::test]
    async fn rescheduling_replaces_instead_of_duplicating() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default());
        let event = event_in(Duration::days(2));

        scheduler.schedule(&event, now()).await.unwrap();
        scheduler.schedule(&event, now()).await.unwrap();

        assert_eq!(scheduler.dispatcher().ids().len(), 3);
        assert_eq!(scheduler.pending_for(&event).await.len(), 3);
    }

    #[tokio::test]
    async fn rescheduling_later_drops_reminders_no_longer_due() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default());
        let event = event_in(Duration::days(2));

        scheduler.schedule(&event, now()).await.unwrap();
        let later = event.date_time - Duration::hours(1);
        let report = scheduler.schedule(&event, later).await.unwrap();

        assert_eq!(report.scheduled, vec![ReminderKind::ThirtyMinutes]);
        assert_eq!(scheduler.dispatcher().ids(), vec![scheduler.reminder_id(&event, ReminderKind::ThirtyMinutes)]);
    }

    #[tokio::test]
    async fn cancel_clears_and_is_idempotent() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default());
        let event = event_in(Duration::days(2));

        scheduler.schedule(&event, now()).await.unwrap();
        scheduler.cancel(&event).await;
        assert!(scheduler.pending_for(&event).await.is_empty());

        scheduler.cancel(&event).await;
        assert!(scheduler.dispatcher().ids().is_empty());
    }

    #[tokio::test]
    async fn cancel_leaves_other_events_alone() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default());
        let first = event_in(Duration::days(2));
        let second = event_in(Duration::days(2));

        scheduler.schedule(&first, now()).await.unwrap();
        scheduler.schedule(&second, now()).await.unwrap();
        scheduler.cancel(&first).await;

        assert!(scheduler.pending_for(&first).await.is_empty());
        assert_eq!(scheduler.pending_for(&second).await.len(), 3);
    }

    #[tokio::test]
    async fn dispatcher_failure_is_reported_per_kind() {
        let dispatcher = FakeDispatcher {
            reject: Some(ReminderKind::TwoHours),
            ..FakeDispatcher::default()
        };
        let scheduler = make_scheduler(FakePermission::granted(), dispatcher);
        let event = event_in(Duration::days(2));

        let report = scheduler.schedule(&event, now()).await.unwrap();

        assert_eq!(
            report.scheduled,
            vec![ReminderKind::DayBefore, ReminderKind::ThirtyMinutes]
        );
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, ReminderKind::TwoHours);
        assert!(!report.is_complete());
        assert_eq!(scheduler.dispatcher().ids().len(), 2);
    }

    #[tokio::test]
    async fn payload_link_rebuilds_the_event() {
        let scheduler = make_scheduler(FakePermission::granted(), FakeDispatcher::default())
            .with_namespace("test.ns")
            .with_time_zone("Europe/Paris".parse().unwrap());
        let event = event_in(Duration::days(2))
            .with_host_name(Some("Sarah Johnson".to_string()))
            .with_coordinates(Some(48.8566), Some(2.3522));

        scheduler.schedule(&event, now()).await.unwrap();

        for reminder in scheduler.pending_for(&event).await {
            assert!(reminder.id.starts_with(&format!("test.ns.{}.", event.id)));
            assert_eq!(reminder.event_id, event.id);
            assert_eq!(reminder.payload.event().unwrap(), event);
        }
    }
}
