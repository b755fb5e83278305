//! Notification rendering for the focus timer.
//!
//! The timer engine never talks to a notification backend directly. It
//! builds a [`RenderRequest`] and hands it to a [`NotificationScheduler`],
//! which is responsible only for presentation:
//!
//! - `Silent` channel: every tick while running, updated in place, never
//!   re-alerts, never replaces the loud slot; cleared when the countdown ends
//! - `Loud` channel: once on completion (or explicit stop), with sound and
//!   vibration, dismissed on tap
//!
//! # Example
//!
//! ```
//! use focus_timer::notification::{MockNotificationScheduler, NotificationScheduler, NotificationTexts};
//! use focus_timer::types::TimeSpan;
//!
//! let scheduler = MockNotificationScheduler::new();
//! let texts = NotificationTexts::default();
//!
//! scheduler.render(&texts.tick_request(TimeSpan::from_secs(90))).unwrap();
//! assert_eq!(scheduler.silent_count(), 1);
//! ```

mod content;
pub mod error;

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub use self::content::NotificationTexts;
pub use self::error::NotificationError;

// ============================================================================
// Channels
// ============================================================================

/// The two logical notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Periodic countdown update.
    Silent,
    /// Completion alert.
    Loud,
}

/// Importance level requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Low,
    High,
}

/// Presentation contract of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSpec {
    /// Stable channel identifier.
    pub id: &'static str,
    pub importance: Importance,
    /// Stays in the shade until the countdown ends.
    pub ongoing: bool,
    /// Dismissed when the user taps it.
    pub auto_dismiss: bool,
    /// Updates never re-alert the user.
    pub only_alert_once: bool,
    pub sound: bool,
    pub vibrate: bool,
    /// Display slot. Requests on the same slot replace each other.
    pub slot: u32,
}

impl ChannelKind {
    /// Returns the presentation contract for this channel.
    #[must_use]
    pub fn spec(&self) -> ChannelSpec {
        match self {
            ChannelKind::Silent => ChannelSpec {
                id: "focus_timer_silent",
                importance: Importance::Low,
                ongoing: true,
                auto_dismiss: false,
                only_alert_once: true,
                sound: false,
                vibrate: false,
                slot: 1,
            },
            ChannelKind::Loud => ChannelSpec {
                id: "focus_timer_loud",
                importance: Importance::High,
                ongoing: false,
                auto_dismiss: true,
                only_alert_once: false,
                sound: true,
                vibrate: true,
                slot: 2,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Silent => "silent",
            ChannelKind::Loud => "loud",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RenderRequest
// ============================================================================

/// Where a tap on the notification leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapIntent {
    /// Screen of the owning UI to open.
    pub screen: String,
}

impl TapIntent {
    /// Screen name of the timer view.
    pub const TIMER_VIEW: &'static str = "pomodoro";

    /// Intent that reopens the owning UI at the timer view.
    #[must_use]
    pub fn timer_view() -> Self {
        Self {
            screen: Self::TIMER_VIEW.to_string(),
        }
    }
}

/// A fully formatted notification handed to a scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub channel: ChannelKind,
    pub title: String,
    pub body: String,
    pub tap: TapIntent,
}

// ============================================================================
// NotificationScheduler
// ============================================================================

/// Presentation backend for timer notifications.
///
/// Implementations must not block: `render` is called from the tick task
/// while the engine lock is held.
pub trait NotificationScheduler: Send + Sync {
    /// Displays (or updates) a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend could not present the request.
    fn render(&self, request: &RenderRequest) -> Result<(), NotificationError>;

    /// Removes whatever is shown in the channel's slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend could not remove it.
    fn clear(&self, channel: ChannelKind) -> Result<(), NotificationError>;

    /// Returns true if notifications can currently be shown.
    fn is_available(&self) -> bool;
}

/// Scheduler that renders notifications into the log.
///
/// Used by the headless runner, where there is no notification shade.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationScheduler for TracingNotifier {
    fn render(&self, request: &RenderRequest) -> Result<(), NotificationError> {
        let spec = request.channel.spec();
        match request.channel {
            ChannelKind::Silent => tracing::debug!(
                channel = spec.id,
                slot = spec.slot,
                "{}: {}",
                request.title,
                request.body
            ),
            ChannelKind::Loud => tracing::info!(
                channel = spec.id,
                slot = spec.slot,
                tap = %request.tap.screen,
                "{}: {}",
                request.title,
                request.body
            ),
        }
        Ok(())
    }

    fn clear(&self, channel: ChannelKind) -> Result<(), NotificationError> {
        let spec = channel.spec();
        tracing::debug!(channel = spec.id, slot = spec.slot, "notification cleared");
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Scheduler that records every request, for tests.
///
/// While unavailable it refuses to render with `NotAvailable`.
#[derive(Debug)]
pub struct MockNotificationScheduler {
    requests: Mutex<Vec<RenderRequest>>,
    showing: Mutex<HashSet<ChannelKind>>,
    cleared: Mutex<Vec<ChannelKind>>,
    available: AtomicBool,
    should_fail: AtomicBool,
}

impl Default for MockNotificationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotificationScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            showing: Mutex::new(HashSet::new()),
            cleared: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RenderRequest> {
        self.requests.lock().unwrap().clone()
    }

    #[must_use]
    pub fn count(&self, channel: ChannelKind) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.channel == channel)
            .count()
    }

    #[must_use]
    pub fn silent_count(&self) -> usize {
        self.count(ChannelKind::Silent)
    }

    #[must_use]
    pub fn loud_count(&self) -> usize {
        self.count(ChannelKind::Loud)
    }

    /// Returns the most recent request on the given channel.
    #[must_use]
    pub fn last(&self, channel: ChannelKind) -> Option<RenderRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.channel == channel)
            .cloned()
    }

    /// Returns true if the channel's slot holds a notification.
    #[must_use]
    pub fn is_showing(&self, channel: ChannelKind) -> bool {
        self.showing.lock().unwrap().contains(&channel)
    }

    /// Returns how many times the channel was cleared.
    #[must_use]
    pub fn cleared_count(&self, channel: ChannelKind) -> usize {
        self.cleared
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == channel)
            .count()
    }

    pub fn clear_recorded(&self) {
        self.requests.lock().unwrap().clear();
        self.cleared.lock().unwrap().clear();
    }
}

impl NotificationScheduler for MockNotificationScheduler {
    fn render(&self, request: &RenderRequest) -> Result<(), NotificationError> {
        if !self.is_available() {
            return Err(NotificationError::NotAvailable);
        }
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        self.requests.lock().unwrap().push(request.clone());
        self.showing.lock().unwrap().insert(request.channel);
        Ok(())
    }

    fn clear(&self, channel: ChannelKind) -> Result<(), NotificationError> {
        self.showing.lock().unwrap().remove(&channel);
        self.cleared.lock().unwrap().push(channel);
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
