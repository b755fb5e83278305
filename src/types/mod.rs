//! Core data types for the focus timer.
//!
//! This module defines the values shared by every layer:
//! - `TimeSpan`: a non-negative duration with hour/minute/second breakdown
//! - `TimerPhase`: the engine's state machine position
//! - `TimerState`: the snapshot broadcast to observers

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Milliseconds in one second.
pub const MILLIS_PER_SECOND: u64 = 1_000;

/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: u64 = 60_000;

/// Milliseconds in one hour.
pub const MILLIS_PER_HOUR: u64 = 3_600_000;

// ============================================================================
// TimeSpan
// ============================================================================

/// A non-negative span of time with millisecond precision.
///
/// Stored as a scalar millisecond count. The component view truncates:
/// a span of 1999ms shows as `00:00:01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeSpan {
    millis: u64,
}

/// Hour/minute/second/millisecond breakdown of a [`TimeSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeComponents {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub milliseconds: u64,
}

impl TimeSpan {
    /// The zero-length span.
    pub const ZERO: TimeSpan = TimeSpan { millis: 0 };

    /// The longest span a countdown can run: the engine counts in `i64`
    /// milliseconds.
    pub const MAX_COUNTDOWN: TimeSpan = TimeSpan {
        millis: i64::MAX as u64,
    };

    /// Creates a span from a millisecond count.
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    /// Creates a span from whole seconds, saturating on overflow.
    pub const fn from_secs(seconds: u64) -> Self {
        Self {
            millis: seconds.saturating_mul(MILLIS_PER_SECOND),
        }
    }

    /// Creates a span from a signed remaining-time value, clamping negatives to zero.
    pub fn from_remaining(millis: i64) -> Self {
        Self {
            millis: u64::try_from(millis).unwrap_or(0),
        }
    }

    /// Sums hours, minutes and seconds into a span.
    ///
    /// Returns `None` if the sum exceeds [`TimeSpan::MAX_COUNTDOWN`].
    pub fn try_compose(hours: u64, minutes: u64, seconds: u64) -> Option<Self> {
        let millis = hours
            .checked_mul(MILLIS_PER_HOUR)?
            .checked_add(minutes.checked_mul(MILLIS_PER_MINUTE)?)?
            .checked_add(seconds.checked_mul(MILLIS_PER_SECOND)?)?;
        (millis <= Self::MAX_COUNTDOWN.millis).then_some(Self { millis })
    }

    /// Sums hours, minutes and seconds into a span, saturating at
    /// [`TimeSpan::MAX_COUNTDOWN`].
    ///
    /// Use [`TimeSpan::try_compose`] for values that come from outside.
    pub fn compose(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self::try_compose(hours, minutes, seconds).unwrap_or(Self::MAX_COUNTDOWN)
    }

    /// Breaks the span into components, truncating each unit.
    pub fn components(&self) -> TimeComponents {
        TimeComponents {
            hours: self.millis / MILLIS_PER_HOUR,
            minutes: (self.millis % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE,
            seconds: (self.millis % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND,
            milliseconds: self.millis % MILLIS_PER_SECOND,
        }
    }

    /// Returns the total milliseconds.
    pub const fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Returns the total milliseconds as the engine's signed representation.
    pub fn as_millis_i64(&self) -> i64 {
        i64::try_from(self.millis).unwrap_or(i64::MAX)
    }

    /// Returns true if the span has no length.
    pub const fn is_zero(&self) -> bool {
        self.millis == 0
    }
}

impl fmt::Display for TimeSpan {
    /// Formats as `HH:MM:SS`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.components();
        write!(f, "{:02}:{:02}:{:02}", c.hours, c.minutes, c.seconds)
    }
}

/// Error returned when parsing a `HH:MM:SS` string fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeSpanParseError {
    /// The input did not have the `HH:MM:SS`, `MM:SS` or `SS` shape.
    #[error("expected HH:MM:SS, got '{0}'")]
    InvalidFormat(String),

    /// Minutes or seconds were 60 or more.
    #[error("{unit} must be below 60, got {value}")]
    OutOfRange { unit: &'static str, value: u64 },

    /// The total is longer than a countdown can run.
    #[error("'{0}' is too long for a countdown")]
    TooLong(String),
}

impl FromStr for TimeSpan {
    type Err = TimeSpanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .trim()
            .split(':')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| TimeSpanParseError::InvalidFormat(s.to_string()))?;

        let (hours, minutes, seconds) = match parts.as_slice() {
            [h, m, s] => (*h, *m, *s),
            [m, s] => (0, *m, *s),
            [s] => (0, 0, *s),
            _ => return Err(TimeSpanParseError::InvalidFormat(s.to_string())),
        };

        if parts.len() > 1 && seconds >= 60 {
            return Err(TimeSpanParseError::OutOfRange {
                unit: "seconds",
                value: seconds,
            });
        }
        if parts.len() > 2 && minutes >= 60 {
            return Err(TimeSpanParseError::OutOfRange {
                unit: "minutes",
                value: minutes,
            });
        }

        TimeSpan::try_compose(hours, minutes, seconds)
            .ok_or_else(|| TimeSpanParseError::TooLong(s.to_string()))
    }
}

// ============================================================================
// TimerPhase
// ============================================================================

/// Position of the engine in its state machine.
///
/// `Idle` doubles as "finished": a completed countdown and a never-started
/// one look the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerPhase {
    /// No countdown
    #[default]
    Idle,
    /// Counting down
    Running,
    /// Countdown frozen; the remaining value lives with the caller
    Paused,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
        }
    }
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Snapshot of the engine published to observers.
///
/// Only the engine builds snapshots. Whenever the timer is not running the
/// remaining time reads as zero.
///
/// `countdown` numbers countdowns from zero in start order. A resume keeps
/// the number of the countdown it continues, so an observer that reads a
/// running snapshot with a new number knows an earlier countdown has ended
/// even if it never saw the idle snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerState {
    phase: TimerPhase,
    remaining_millis: i64,
    active_selector_index: usize,
    countdown: u64,
}

impl TimerState {
    /// Snapshot of an idle (or finished) timer.
    pub fn idle(active_selector_index: usize) -> Self {
        Self {
            phase: TimerPhase::Idle,
            remaining_millis: 0,
            active_selector_index,
            countdown: 0,
        }
    }

    /// Snapshot of a running countdown.
    pub fn running(remaining_millis: i64, active_selector_index: usize) -> Self {
        Self {
            phase: TimerPhase::Running,
            remaining_millis: remaining_millis.max(0),
            active_selector_index,
            countdown: 0,
        }
    }

    /// Snapshot of a paused countdown.
    pub fn paused(active_selector_index: usize) -> Self {
        Self {
            phase: TimerPhase::Paused,
            remaining_millis: 0,
            active_selector_index,
            countdown: 0,
        }
    }

    /// Tags the snapshot with the countdown it belongs to.
    pub fn with_countdown(mut self, countdown: u64) -> Self {
        self.countdown = countdown;
        self
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn remaining_millis(&self) -> i64 {
        self.remaining_millis
    }

    /// Remaining time as a span.
    pub fn remaining(&self) -> TimeSpan {
        TimeSpan::from_remaining(self.remaining_millis)
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == TimerPhase::Paused
    }

    /// Returns true if the timer is neither running nor paused.
    pub fn is_idle(&self) -> bool {
        self.phase == TimerPhase::Idle
    }

    pub fn active_selector_index(&self) -> usize {
        self.active_selector_index
    }

    pub fn countdown(&self) -> u64 {
        self.countdown
    }
}

// ============================================================================
// Tests
// ============================================================================
