//! Toast notifications.
//!
//! A toast is shown (`Active`), starts its exit when its duration elapses or
//! it is dismissed (`Closing`), and is dropped from the set once the exit grace
//! period has passed (`Removed`). Transitions happen in [`ToastBus::tick`];
//! nothing here sleeps, so the state machine runs the same under a
//! [`ManualClock`](crate::ManualClock) as under real time.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch, Notify};

use crate::{AppEvent, Clock, ToastRequest};

/// Display duration when a request does not specify one.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(5000);

/// Time between a toast starting to close and its removal.
pub const TOAST_GRACE_PERIOD: Duration = Duration::from_millis(300);

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Warning => "warning",
            ToastKind::Error => "error",
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic toast identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToastId(u64);

impl ToastId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle phase of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    /// Visible.
    Active,
    /// Exit animation running; still part of the set.
    Closing,
    /// Gone from the set.
    Removed,
}

/// A toast in the active set.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub kind: ToastKind,
    pub duration: Duration,
    pub phase: ToastPhase,
    shown_at: Duration,
    closing_since: Option<Duration>,
}

impl Toast {
    fn expires_at(&self) -> Duration {
        self.shown_at + self.duration
    }

    /// Whether the toast should render in its hidden (exiting) style.
    pub fn is_closing(&self) -> bool {
        self.phase == ToastPhase::Closing
    }
}

/// The toast state machine.
pub struct ToastBus {
    clock: Arc<dyn Clock>,
    toasts: Vec<Toast>,
    next_id: u64,
    default_duration: Duration,
    grace: Duration,
}

impl fmt::Debug for ToastBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastBus")
            .field("toasts", &self.toasts)
            .field("next_id", &self.next_id)
            .field("default_duration", &self.default_duration)
            .field("grace", &self.grace)
            .finish()
    }
}

impl ToastBus {
    /// Create an empty set on `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            toasts: Vec::new(),
            next_id: 1,
            default_duration: DEFAULT_TOAST_DURATION,
            grace: TOAST_GRACE_PERIOD,
        }
    }

    /// Set the duration used when a request has none.
    pub fn with_default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = duration;
        self
    }

    /// Set the closing grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Show a toast. Ids are never reused.
    pub fn show(
        &mut self,
        message: impl Into<String>,
        kind: ToastKind,
        duration: Option<Duration>,
    ) -> ToastId {
        let id = ToastId(self.next_id);
        self.next_id += 1;
        let toast = Toast {
            id,
            message: message.into(),
            kind,
            duration: duration.unwrap_or(self.default_duration),
            phase: ToastPhase::Active,
            shown_at: self.clock.now(),
            closing_since: None,
        };
        tracing::debug!(id = id.get(), kind = %kind, "toast shown");
        self.toasts.push(toast);
        id
    }

    /// Show a toast from a bus request.
    pub fn show_request(&mut self, request: ToastRequest) -> ToastId {
        self.show(request.message, request.kind, request.duration)
    }

    /// Start closing a toast now. Returns false if it was not active.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let now = self.clock.now();
        match self
            .toasts
            .iter_mut()
            .find(|t| t.id == id && t.phase == ToastPhase::Active)
        {
            Some(toast) => {
                toast.phase = ToastPhase::Closing;
                toast.closing_since = Some(now);
                true
            }
            None => false,
        }
    }

    /// Apply every transition due at the current time.
    ///
    /// Returns true if the set changed.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let grace = self.grace;
        let mut changed = false;

        for toast in &mut self.toasts {
            if toast.phase == ToastPhase::Active && now >= toast.expires_at() {
                toast.phase = ToastPhase::Closing;
                toast.closing_since = Some(toast.expires_at());
                changed = true;
            }
        }

        let before = self.toasts.len();
        self.toasts.retain(|t| {
            !t.closing_since
                .map_or(false, |since| now >= since + grace)
        });
        changed || self.toasts.len() != before
    }

    /// Toasts in the set, in the order they were shown.
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Current phase of a toast, or `None` for an id never issued.
    pub fn phase(&self, id: ToastId) -> Option<ToastPhase> {
        if let Some(toast) = self.toasts.iter().find(|t| t.id == id) {
            return Some(toast.phase);
        }
        (id.0 < self.next_id).then_some(ToastPhase::Removed)
    }

    /// Time until the next transition, if any toast is pending one.
    pub fn time_to_next_transition(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.toasts
            .iter()
            .map(|t| match t.closing_since {
                Some(since) => since + self.grace,
                None => t.expires_at(),
            })
            .min()
            .map(|at| at.saturating_sub(now))
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// Shared handle on a [`ToastBus`] that renderers can watch.
#[derive(Clone)]
pub struct ToastCenter {
    bus: Arc<Mutex<ToastBus>>,
    changes: watch::Sender<Vec<Toast>>,
    /// Wakes the driver when a deadline moves outside of it.
    rescheduled: Arc<Notify>,
}

impl fmt::Debug for ToastCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastCenter").finish_non_exhaustive()
    }
}

impl ToastCenter {
    /// Wrap a state machine.
    pub fn new(bus: ToastBus) -> Self {
        let (changes, _) = watch::channel(bus.toasts().to_vec());
        Self {
            bus: Arc::new(Mutex::new(bus)),
            changes,
            rescheduled: Arc::new(Notify::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ToastBus> {
        self.bus.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, bus: &ToastBus) {
        self.changes.send_replace(bus.toasts().to_vec());
    }

    /// Watch the rendered set; a new value is sent on every change.
    pub fn watch(&self) -> watch::Receiver<Vec<Toast>> {
        self.changes.subscribe()
    }

    pub fn show(&self, message: impl Into<String>, kind: ToastKind, duration: Option<Duration>) -> ToastId {
        let mut bus = self.lock();
        let id = bus.show(message, kind, duration);
        self.publish(&bus);
        self.rescheduled.notify_one();
        id
    }

    pub fn dismiss(&self, id: ToastId) -> bool {
        let mut bus = self.lock();
        let dismissed = bus.dismiss(id);
        if dismissed {
            self.publish(&bus);
            self.rescheduled.notify_one();
        }
        dismissed
    }

    pub fn tick(&self) -> bool {
        let mut bus = self.lock();
        let changed = bus.tick();
        if changed {
            self.publish(&bus);
        }
        changed
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        self.lock().toasts().to_vec()
    }

    pub fn phase(&self, id: ToastId) -> Option<ToastPhase> {
        self.lock().phase(id)
    }

    fn time_to_next_transition(&self) -> Option<Duration> {
        self.lock().time_to_next_transition()
    }

    /// Drive the set: show toasts requested on `events` and fire transitions
    /// on time. Returns when the bus is closed.
    pub async fn run(self, mut events: broadcast::Receiver<AppEvent>) {
        loop {
            let wait = self.time_to_next_transition();
            let timer = async move {
                match wait {
                    Some(d) => tokio::time::sleep(d).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                event = events.recv() => match event {
                    Ok(AppEvent::ShowToast(request)) => {
                        let mut bus = self.lock();
                        bus.show_request(request);
                        self.publish(&bus);
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "toast driver lagged behind the event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = timer => {
                    self.tick();
                }
                _ = self.rescheduled.notified() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventBus, ManualClock, TokioClock};

    fn bus() -> (ManualClock, ToastBus) {
        let clock = ManualClock::new();
        (clock.clone(), ToastBus::new(Arc::new(clock)))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_ids_are_monotonic_and_order_is_insertion() {
        let (_, mut bus) = bus();
        let a = bus.show("one", ToastKind::Info, None);
        let b = bus.show("two", ToastKind::Error, None);
        assert!(b > a);

        let messages: Vec<_> = bus.toasts().iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two"]);
    }

    #[test]
    fn test_two_phase_expiry() {
        let (clock, mut bus) = bus();
        let id = bus.show("Saved", ToastKind::Success, Some(ms(5000)));

        clock.set(ms(4999));
        bus.tick();
        assert_eq!(bus.phase(id), Some(ToastPhase::Active));

        clock.set(ms(5000));
        assert!(bus.tick());
        assert_eq!(bus.phase(id), Some(ToastPhase::Closing));
        assert!(bus.toasts()[0].is_closing());

        clock.set(ms(5299));
        bus.tick();
        assert_eq!(bus.phase(id), Some(ToastPhase::Closing));

        clock.set(ms(5300));
        assert!(bus.tick());
        assert_eq!(bus.phase(id), Some(ToastPhase::Removed));
        assert!(bus.is_empty());
    }

    #[test]
    fn test_late_tick_applies_both_transitions() {
        let (clock, mut bus) = bus();
        let id = bus.show("x", ToastKind::Info, Some(ms(1000)));
        clock.set(ms(10_000));
        bus.tick();
        assert_eq!(bus.phase(id), Some(ToastPhase::Removed));
    }

    #[test]
    fn test_dismiss_follows_same_path() {
        let (clock, mut bus) = bus();
        let id = bus.show("x", ToastKind::Warning, None);

        clock.set(ms(100));
        assert!(bus.dismiss(id));
        assert!(!bus.dismiss(id));
        assert_eq!(bus.phase(id), Some(ToastPhase::Closing));

        clock.set(ms(399));
        bus.tick();
        assert_eq!(bus.phase(id), Some(ToastPhase::Closing));

        clock.set(ms(400));
        bus.tick();
        assert_eq!(bus.phase(id), Some(ToastPhase::Removed));
    }

    #[test]
    fn test_unknown_id_has_no_phase() {
        let (_, bus) = bus();
        assert_eq!(bus.phase(ToastId(42)), None);
    }

    #[test]
    fn test_no_cap_on_active_toasts() {
        let (_, mut bus) = bus();
        for i in 0..50 {
            bus.show(format!("t{}", i), ToastKind::Info, None);
        }
        assert_eq!(bus.toasts().len(), 50);
    }

    #[test]
    fn test_time_to_next_transition() {
        let (clock, mut bus) = bus();
        assert_eq!(bus.time_to_next_transition(), None);

        bus.show("a", ToastKind::Info, Some(ms(3000)));
        bus.show("b", ToastKind::Info, Some(ms(1000)));
        assert_eq!(bus.time_to_next_transition(), Some(ms(1000)));

        clock.set(ms(1000));
        bus.tick();
        assert_eq!(bus.time_to_next_transition(), Some(ms(300)));
    }

    #[test]
    fn test_default_duration_is_configurable() {
        let (clock, bus) = bus();
        let mut bus = bus.with_default_duration(ms(200)).with_grace(ms(50));
        let id = bus.show("x", ToastKind::Info, None);
        clock.set(ms(250));
        bus.tick();
        assert_eq!(bus.phase(id), Some(ToastPhase::Removed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_center_driven_by_event_bus() {
        let events = EventBus::default();
        let center = ToastCenter::new(ToastBus::new(Arc::new(TokioClock::new())));
        let mut rendered = center.watch();

        let driver = tokio::spawn(center.clone().run(events.subscribe()));

        events.publish(AppEvent::ShowToast(
            ToastRequest::new(ToastKind::Success, "Added to cart").with_duration(ms(5000)),
        ));
        rendered.changed().await.unwrap();
        assert_eq!(rendered.borrow_and_update().len(), 1);
        let id = center.snapshot()[0].id;

        tokio::time::sleep(ms(5010)).await;
        assert_eq!(center.phase(id), Some(ToastPhase::Closing));

        tokio::time::sleep(ms(300)).await;
        assert_eq!(center.phase(id), Some(ToastPhase::Removed));

        drop(events);
        driver.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_under_driver_uses_grace_from_dismissal() {
        let events = EventBus::default();
        let center = ToastCenter::new(ToastBus::new(Arc::new(TokioClock::new())));
        let mut rendered = center.watch();

        let driver = tokio::spawn(center.clone().run(events.subscribe()));

        events.publish(AppEvent::ShowToast(
            ToastRequest::new(ToastKind::Info, "Saved").with_duration(ms(5000)),
        ));
        rendered.changed().await.unwrap();
        let id = center.snapshot()[0].id;

        tokio::time::sleep(ms(10)).await;
        assert!(center.dismiss(id));
        assert_eq!(center.phase(id), Some(ToastPhase::Closing));

        tokio::time::sleep(ms(400)).await;
        assert_eq!(center.phase(id), Some(ToastPhase::Removed));

        drop(events);
        driver.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_show_wakes_driver() {
        let events = EventBus::default();
        let center = ToastCenter::new(ToastBus::new(Arc::new(TokioClock::new())));
        let driver = tokio::spawn(center.clone().run(events.subscribe()));
        tokio::task::yield_now().await;

        let id = center.show("Quick", ToastKind::Warning, Some(ms(100)));
        tokio::time::sleep(ms(450)).await;
        assert_eq!(center.phase(id), Some(ToastPhase::Removed));

        drop(events);
        driver.await.unwrap();
    }
}
