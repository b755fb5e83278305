//! Timer error types.
//!
//! `NoActiveSelector`, `InvalidSelector` and `HostUnavailable` signal bugs
//! or an unusable environment. `NotRunning` is what a double click on
//! pause/stop produces and callers treat it as a no-op.

use thiserror::Error;

use crate::notification::NotificationError;
use crate::selector::StoreError;

/// Errors produced by the timer engine, host and screen controller.
#[derive(Debug, Error)]
pub enum TimerError {
    /// An operation needed an active selector and found none.
    #[error("no active duration selector")]
    NoActiveSelector,

    /// Pause, resume or stop was requested while no countdown was active.
    #[error("timer is not running")]
    NotRunning,

    /// The timer host could not be constructed.
    #[error("timer host is unavailable: {0}")]
    HostUnavailable(String),

    /// Start was requested while a countdown is running or paused.
    #[error("a countdown is already active")]
    AlreadyActive,

    /// No selector exists at the given index.
    #[error("no duration selector at index {0}")]
    InvalidSelector(usize),

    /// A countdown length was negative.
    #[error("invalid countdown duration: {0}ms")]
    InvalidDuration(i64),

    /// Selectors cannot change while a countdown is active.
    #[error("selectors are locked while a countdown is active")]
    SelectorLocked,

    /// The notification backend refused or failed.
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// The duration store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TimerError {
    /// Returns true if the UI can carry on after this error.
    ///
    /// Unrecoverable errors indicate a bug and should be logged as such.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::NoActiveSelector | Self::HostUnavailable(_) | Self::InvalidSelector(_)
        )
    }

    /// Returns true if the UI should ask for notification permission.
    #[must_use]
    pub fn requires_permission(&self) -> bool {
        matches!(self, Self::Notification(e) if e.is_permission_error())
    }

    /// Returns true for the double-click case that callers ignore.
    #[must_use]
    pub fn is_not_running(&self) -> bool {
        matches!(self, Self::NotRunning)
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NoActiveSelector => "configure at least one duration selector",
            Self::NotRunning => "start a countdown first",
            Self::HostUnavailable(_) => "restart the application",
            Self::AlreadyActive => "stop the current countdown before starting another",
            Self::InvalidSelector(_) => "pick one of the configured selectors",
            Self::InvalidDuration(_) => "use a duration of zero or more",
            Self::SelectorLocked => "stop the countdown before changing selectors",
            Self::Notification(e) => e.suggestion(),
            Self::Store(e) => e.suggestion(),
        }
    }
}
