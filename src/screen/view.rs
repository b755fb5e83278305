//! Rendering adapter for the timer screen.

use std::fmt;

use crate::selector::{Color, DurationSelector};
use crate::types::TimeSpan;

// ============================================================================
// ControlLayout
// ============================================================================

/// A button on the timer screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Change,
    Pause,
    Resume,
    Stop,
}

/// Which set of controls the screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlLayout {
    /// Start and change selector.
    #[default]
    Idle,
    /// Pause and stop.
    Running,
    /// Resume and stop.
    Paused,
}

impl ControlLayout {
    pub fn controls(&self) -> &'static [Control] {
        match self {
            Self::Idle => &[Control::Start, Control::Change],
            Self::Running => &[Control::Pause, Control::Stop],
            Self::Paused => &[Control::Resume, Control::Stop],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for ControlLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// TimerView
// ============================================================================

/// Draws the timer screen. Implementations only present; they never call
/// back into the host.
pub trait TimerView {
    /// Switches the visible controls.
    fn show_layout(&mut self, layout: ControlLayout);

    /// Redraws one selector with its displayed time and current color.
    fn show_selector(&mut self, index: usize, selector: &DurationSelector);

    /// Tints the screen with the active selector's color.
    fn show_background(&mut self, color: Color);

    /// Asks the user to allow notifications after a refused start.
    fn request_permission(&mut self);
}

/// Something a [`RecordingView`] was asked to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Layout(ControlLayout),
    Selector {
        index: usize,
        displayed: TimeSpan,
        color: Color,
    },
    Background(Color),
    PermissionRequested,
}

/// View that records every draw call, for tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingView {
    events: Vec<ViewEvent>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ViewEvent] {
        &self.events
    }

    /// The most recently shown layout.
    pub fn layout(&self) -> Option<ControlLayout> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::Layout(layout) => Some(*layout),
            _ => None,
        })
    }

    /// The most recently drawn time for the selector at `index`.
    pub fn displayed(&self, index: usize) -> Option<TimeSpan> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::Selector {
                index: i,
                displayed,
                ..
            } if *i == index => Some(*displayed),
            _ => None,
        })
    }

    pub fn permission_requests(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ViewEvent::PermissionRequested))
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TimerView for RecordingView {
    fn show_layout(&mut self, layout: ControlLayout) {
        self.events.push(ViewEvent::Layout(layout));
    }

    fn show_selector(&mut self, index: usize, selector: &DurationSelector) {
        self.events.push(ViewEvent::Selector {
            index,
            displayed: selector.displayed(),
            color: selector.color(),
        });
    }

    fn show_background(&mut self, color: Color) {
        self.events.push(ViewEvent::Background(color));
    }

    fn request_permission(&mut self) {
        self.events.push(ViewEvent::PermissionRequested);
    }
}
