//! Notification port.
//!
//! # Design
//! The classifier never talks to a UI. It returns a `Notification` value and
//! the dispatcher hands it to whatever `NotificationSink` it was built with.
//! `show` reproduces the sink protocol the UI layer expects: `configure` is
//! called immediately before each `success`/`error`.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};

pub const SUCCESS_TITLE: &str = "Request success";
pub const SUCCESS_DURATION: Duration = Duration::from_secs(2);
pub const ERROR_DURATION: Duration = Duration::from_secs(4);
pub const MAX_VISIBLE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A user-facing notification produced by classifying a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    /// Auto-dismiss delay.
    pub duration: Duration,
    /// Upper bound on simultaneously visible notifications.
    pub max_visible: usize,
}

impl Notification {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: SUCCESS_TITLE.to_string(),
            description: description.into(),
            duration: SUCCESS_DURATION,
            max_visible: MAX_VISIBLE,
        }
    }

    pub fn error(status: u16, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: format!("Request error {status}"),
            description: description.into(),
            duration: ERROR_DURATION,
            max_visible: MAX_VISIBLE,
        }
    }
}

pub trait NotificationSink: Send + Sync {
    fn configure(&self, duration: Duration, max_visible: usize);

    fn success(&self, title: &str, description: &str);

    fn error(&self, title: &str, description: &str);

    fn show(&self, notification: &Notification) {
        self.configure(notification.duration, notification.max_visible);
        match notification.kind {
            NotificationKind::Success => self.success(&notification.title, &notification.description),
            NotificationKind::Error => self.error(&notification.title, &notification.description),
        }
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn configure(&self, _duration: Duration, _max_visible: usize) {}

    fn success(&self, _title: &str, _description: &str) {}

    fn error(&self, _title: &str, _description: &str) {}
}

/// Writes notifications to the tracing subscriber. Useful for headless
/// callers that still want the messages somewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn configure(&self, _duration: Duration, _max_visible: usize) {}

    fn success(&self, title: &str, description: &str) {
        info!(title, description, "notification");
    }

    fn error(&self, title: &str, description: &str) {
        warn!(title, description, "notification");
    }
}

/// Records every notification shown to it.
#[derive(Debug, Default)]
pub struct CollectingSink {
    shown: Mutex<Vec<Notification>>,
    config: Mutex<Option<(Duration, usize)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.shown).clone()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        lock(&self.shown).iter().filter(|n| n.kind == kind).count()
    }

    pub fn clear(&self) {
        lock(&self.shown).clear();
    }

    fn record(&self, kind: NotificationKind, title: &str, description: &str) {
        let (duration, max_visible) = lock(&self.config).unwrap_or(match kind {
            NotificationKind::Success => (SUCCESS_DURATION, MAX_VISIBLE),
            NotificationKind::Error => (ERROR_DURATION, MAX_VISIBLE),
        });
        lock(&self.shown).push(Notification {
            kind,
            title: title.to_string(),
            description: description.to_string(),
            duration,
            max_visible,
        });
    }
}

impl NotificationSink for CollectingSink {
    fn configure(&self, duration: Duration, max_visible: usize) {
        *lock(&self.config) = Some((duration, max_visible));
    }

    fn success(&self, title: &str, description: &str) {
        self.record(NotificationKind::Success, title, description);
    }

    fn error(&self, title: &str, description: &str) {
        self.record(NotificationKind::Error, title, description);
    }
}

/// Keeps the currently visible notifications: at most the configured count,
/// each dismissed once its duration has elapsed.
#[derive(Debug)]
pub struct ToastBoard {
    state: Mutex<BoardState>,
}

#[derive(Debug)]
struct BoardState {
    duration: Duration,
    max_visible: usize,
    visible: VecDeque<(Instant, Duration, Notification)>,
}

impl Default for ToastBoard {
    fn default() -> Self {
        Self {
            state: Mutex::new(BoardState {
                duration: SUCCESS_DURATION,
                max_visible: MAX_VISIBLE,
                visible: VecDeque::new(),
            }),
        }
    }
}

impl ToastBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible notifications as of `now`, oldest first.
    pub fn visible_at(&self, now: Instant) -> Vec<Notification> {
        let mut state = lock(&self.state);
        state.expire(now);
        state.visible.iter().map(|(_, _, n)| n.clone()).collect()
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.visible_at(Instant::now())
    }

    fn push(&self, kind: NotificationKind, title: &str, description: &str) {
        let now = Instant::now();
        let mut state = lock(&self.state);
        state.expire(now);
        let notification = Notification {
            kind,
            title: title.to_string(),
            description: description.to_string(),
            duration: state.duration,
            max_visible: state.max_visible,
        };
        let duration = state.duration;
        state.visible.push_back((now, duration, notification));
        while state.visible.len() > state.max_visible {
            state.visible.pop_front();
        }
    }
}

impl BoardState {
    fn expire(&mut self, now: Instant) {
        self.visible
            .retain(|(shown_at, duration, _)| now.duration_since(*shown_at) < *duration);
    }
}

impl NotificationSink for ToastBoard {
    fn configure(&self, duration: Duration, max_visible: usize) {
        let mut state = lock(&self.state);
        state.duration = duration;
        state.max_visible = max_visible;
    }

    fn success(&self, title: &str, description: &str) {
        self.push(NotificationKind::Success, title, description);
    }

    fn error(&self, title: &str, description: &str) {
        self.push(NotificationKind::Error, title, description);
    }
}

// A poisoned lock only means another notifier panicked mid-push; the data is
// still usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
