//! UI-side timer controller.
//!
//! A [`TimerScreen`] is one attached observer of the timer host. It turns
//! button presses into host calls and host snapshots into draw calls on a
//! [`TimerView`]. Screens may be created and dropped freely; the countdown
//! lives in the host and keeps running without them.
//!
//! On attach the screen adopts whatever the host is doing: a running or
//! paused countdown takes over the active selector and the matching layout
//! before any remaining time is drawn. When a countdown it has seen ends
//! (stopped or finished), the screen restores the selector's persisted
//! length and moves on to the next selector, once per countdown. Snapshots
//! only carry the latest state, so an end the screen never saw is detected
//! from the countdown number of the next running snapshot.

mod view;

use std::sync::Arc;

use crate::daemon::{Attachment, HostRegistry, TimerError, TimerHost};
use crate::selector::{DurationStore, SelectorSet};
use crate::types::{TimeSpan, TimerPhase, TimerState};

pub use self::view::{Control, ControlLayout, RecordingView, TimerView, ViewEvent};

// ============================================================================
// TimerScreen
// ============================================================================

/// Controller for one timer screen.
pub struct TimerScreen<V: TimerView> {
    attachment: Attachment,
    selectors: SelectorSet,
    store: Arc<dyn DurationStore>,
    view: V,
    layout: ControlLayout,
    /// Number of the countdown this screen is following.
    following: Option<u64>,
}

impl<V: TimerView> TimerScreen<V> {
    /// Attaches to the host and draws the initial screen.
    ///
    /// # Errors
    ///
    /// Returns `HostUnavailable` if the host cannot be built.
    pub fn attach(
        registry: &Arc<HostRegistry>,
        selectors: SelectorSet,
        store: Arc<dyn DurationStore>,
        view: V,
    ) -> Result<Self, TimerError> {
        let mut attachment = registry.attach()?;
        let snapshot = attachment.subscription().current();

        let mut screen = Self {
            attachment,
            selectors,
            store,
            view,
            layout: ControlLayout::Idle,
            following: None,
        };
        screen.observe_first(snapshot);
        Ok(screen)
    }

    fn observe_first(&mut self, state: TimerState) {
        tracing::debug!(phase = %state.phase(), "first observation");

        match state.phase() {
            TimerPhase::Running => {
                self.adopt(state.active_selector_index());
                self.following = Some(state.countdown());
                self.layout = ControlLayout::Running;
                self.view.show_layout(self.layout);
                self.selectors
                    .active_mut()
                    .show_remaining(state.remaining_millis());
            }
            TimerPhase::Paused => {
                self.adopt(state.active_selector_index());
                self.following = Some(state.countdown());
                self.layout = ControlLayout::Paused;
                self.view.show_layout(self.layout);
                if let Some(remaining) = self.host().paused_remaining() {
                    self.selectors.active_mut().show_remaining(remaining);
                }
            }
            TimerPhase::Idle => self.view.show_layout(self.layout),
        }

        self.draw_selectors();
    }

    /// Applies a snapshot published after attach.
    pub fn apply(&mut self, state: TimerState) {
        match state.phase() {
            TimerPhase::Running => {
                self.follow(state);
                self.set_layout(ControlLayout::Running);
                self.selectors
                    .active_mut()
                    .show_remaining(state.remaining_millis());
                self.draw_active();
            }
            TimerPhase::Paused => {
                self.follow(state);
                self.set_layout(ControlLayout::Paused);
                if let Some(remaining) = self.host().paused_remaining() {
                    self.selectors.active_mut().show_remaining(remaining);
                    self.draw_active();
                }
            }
            TimerPhase::Idle => {
                if self.following.take().is_some() {
                    self.finish_countdown();
                }
            }
        }
    }

    /// Applies the newest snapshot if one arrived since the last read.
    pub fn sync(&mut self) -> Option<TimerState> {
        let state = self.attachment.subscription().try_next()?;
        self.apply(state);
        Some(state)
    }

    /// Waits for the next snapshot and applies it.
    ///
    /// Returns `None` once the host is gone.
    pub async fn next(&mut self) -> Option<TimerState> {
        let state = self.attachment.subscription().changed().await?;
        self.apply(state);
        Some(state)
    }

    // ------------------------------------------------------------------------
    // Controls
    // ------------------------------------------------------------------------

    /// Starts the active selector's countdown.
    ///
    /// # Errors
    ///
    /// Returns the host's refusal. A permission refusal also asks the view
    /// to request notification permission.
    pub fn start(&mut self) -> Result<(), TimerError> {
        let duration = self.selectors.active().persisted().as_millis_i64();
        let index = self.selectors.active_index();

        let result = self.host().start(duration, index);
        self.after_control(result)
    }

    /// Pauses the countdown. A no-op if nothing is running.
    ///
    /// # Errors
    ///
    /// Returns any host error other than `NotRunning`.
    pub fn pause(&mut self) -> Result<(), TimerError> {
        let result = self.host().pause().map(|_| ());
        self.after_control(result)
    }

    /// Resumes a paused countdown. A no-op if nothing is paused.
    ///
    /// # Errors
    ///
    /// Returns any host error other than `NotRunning`.
    pub fn resume(&mut self) -> Result<(), TimerError> {
        let result = self.host().resume();
        self.after_control(result)
    }

    /// Stops the countdown. A no-op if nothing is active.
    ///
    /// # Errors
    ///
    /// Returns any host error other than `NotRunning`.
    pub fn stop(&mut self) -> Result<(), TimerError> {
        let result = self.host().stop();
        self.after_control(result)
    }

    /// Moves to the next selector.
    ///
    /// # Errors
    ///
    /// Returns `SelectorLocked` while a countdown is active.
    pub fn change(&mut self) -> Result<(), TimerError> {
        self.ensure_unlocked()?;
        let color = self.selectors.cycle();
        self.view.show_background(color);
        self.draw_selectors();
        Ok(())
    }

    /// Makes the selector at `index` active.
    ///
    /// # Errors
    ///
    /// Returns `SelectorLocked` while a countdown is active, or
    /// `InvalidSelector` for an unknown index.
    pub fn select(&mut self, index: usize) -> Result<(), TimerError> {
        self.ensure_unlocked()?;
        let color = self.selectors.activate(index)?;
        self.view.show_background(color);
        self.draw_selectors();
        Ok(())
    }

    /// Stores a new length for the selector at `index`.
    ///
    /// # Errors
    ///
    /// Returns `SelectorLocked` while a countdown is active, or the store error.
    pub fn edit(&mut self, index: usize, span: TimeSpan) -> Result<(), TimerError> {
        self.ensure_unlocked()?;
        self.selectors.edit(index, span, self.store.as_ref())?;
        if let Some(selector) = self.selectors.get(index) {
            self.view.show_selector(index, selector);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn host(&self) -> &TimerHost {
        self.attachment.host()
    }

    pub fn selectors(&self) -> &SelectorSet {
        &self.selectors
    }

    pub fn layout(&self) -> ControlLayout {
        self.layout
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Detaches from the host without stopping it and hands back the view.
    pub fn detach(self) -> V {
        tracing::debug!(host = %self.host().id(), "screen detached");
        self.view
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn after_control(&mut self, result: Result<(), TimerError>) -> Result<(), TimerError> {
        match result {
            Ok(()) => {
                self.sync();
                Ok(())
            }
            Err(e) if e.is_not_running() => {
                tracing::debug!("ignoring control, timer is not running");
                Ok(())
            }
            Err(e) => {
                if e.requires_permission() {
                    self.view.request_permission();
                }
                Err(e)
            }
        }
    }

    fn ensure_unlocked(&self) -> Result<(), TimerError> {
        if self.host().is_idle() {
            Ok(())
        } else {
            Err(TimerError::SelectorLocked)
        }
    }

    fn adopt(&mut self, index: usize) {
        match self.selectors.activate(index) {
            Ok(color) => self.view.show_background(color),
            Err(e) => tracing::error!(error = %e, "host reported an unknown selector"),
        }
    }

    /// Tracks the countdown a running or paused snapshot belongs to.
    ///
    /// A new number means the previous countdown ended unseen; its stop
    /// transition runs before the new countdown's selector is adopted.
    fn follow(&mut self, state: TimerState) {
        if let Some(previous) = self.following {
            if previous != state.countdown() {
                tracing::debug!(previous, next = state.countdown(), "missed end of countdown");
                self.finish_countdown();
            }
        }
        self.following = Some(state.countdown());

        if state.active_selector_index() != self.selectors.active_index() {
            self.adopt(state.active_selector_index());
            self.draw_selectors();
        }
    }

    fn finish_countdown(&mut self) {
        self.selectors.active_mut().restore();
        let color = self.selectors.cycle();
        self.set_layout(ControlLayout::Idle);
        self.view.show_background(color);
        self.draw_selectors();

        tracing::debug!(
            next = self.selectors.active().name(),
            "countdown ended, advanced selector"
        );
    }

    fn set_layout(&mut self, layout: ControlLayout) {
        if self.layout != layout {
            self.layout = layout;
            self.view.show_layout(layout);
        }
    }

    fn draw_active(&mut self) {
        let index = self.selectors.active_index();
        self.view.show_selector(index, self.selectors.active());
    }

    fn draw_selectors(&mut self) {
        for (index, selector) in self.selectors.iter().enumerate() {
            self.view.show_selector(index, selector);
        }
    }
}

impl<V: TimerView + std::fmt::Debug> std::fmt::Debug for TimerScreen<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerScreen")
            .field("host", self.host())
            .field("active", &self.selectors.active_index())
            .field("layout", &self.layout)
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}
