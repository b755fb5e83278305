//! Timer engine for the focus timer.
//!
//! This module provides the core countdown functionality:
//! - Start/pause/stop transitions (Idle → Running → Paused/Idle)
//! - Countdown ticks scheduled by [`Countdown`]
//! - Snapshot publishing through [`StateBroadcaster`]
//! - Silent tick and loud completion notifications
//!
//! Every transition happens under one lock. Ticks carry the generation they
//! were scheduled in and are dropped once a pause, stop or restart has moved
//! the generation on, so no tick lands after the transition that cancelled it.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;

use super::broadcast::{StateBroadcaster, StateSubscription};
use super::countdown::Countdown;
use super::error::TimerError;
use crate::notification::{
    ChannelKind, NotificationError, NotificationScheduler, NotificationTexts, RenderRequest,
};
use crate::types::{TimeSpan, TimerPhase, TimerState};

// ============================================================================
// EngineState
// ============================================================================

/// Mutable engine state guarded by the engine lock.
#[derive(Debug, Default)]
struct EngineState {
    phase: TimerPhase,
    remaining_millis: i64,
    selector_index: usize,
    generation: u64,
    countdown: Option<Countdown>,
    /// Number of the current (or last) countdown.
    countdown_number: u64,
    started_count: u64,
    completed_count: u64,
}

impl EngineState {
    /// Cancels the current schedule and invalidates its pending ticks.
    fn cancel_countdown(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
    }

    fn snapshot(&self) -> TimerState {
        let state = match self.phase {
            TimerPhase::Running => TimerState::running(self.remaining_millis, self.selector_index),
            TimerPhase::Paused => TimerState::paused(self.selector_index),
            TimerPhase::Idle => TimerState::idle(self.selector_index),
        };
        state.with_countdown(self.countdown_number)
    }

    /// Ends the countdown: back to idle with nothing left.
    fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.remaining_millis = 0;
    }
}

/// State shared between the engine handle and its tick task.
struct EngineShared {
    state: Mutex<EngineState>,
    broadcaster: StateBroadcaster,
    notifier: Arc<dyn NotificationScheduler>,
    texts: NotificationTexts,
}

impl EngineShared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, request: &RenderRequest) {
        if let Err(e) = self.notifier.render(request) {
            tracing::warn!(channel = %request.channel, error = %e, "failed to render notification");
        }
    }

    /// Takes down the ongoing update and raises the completion alert.
    fn render_completion(&self) {
        let channel = ChannelKind::Silent;
        if let Err(e) = self.notifier.clear(channel) {
            tracing::warn!(%channel, error = %e, "failed to clear notification");
        }
        self.render(&self.texts.completion_request());
    }

    /// Applies one tick if it still belongs to the live schedule.
    fn tick(&self, generation: u64, remaining_millis: i64) -> ControlFlow<()> {
        let mut state = self.lock();
        if state.generation != generation || state.phase != TimerPhase::Running {
            return ControlFlow::Break(());
        }

        state.remaining_millis = remaining_millis;
        self.broadcaster.publish(state.snapshot());
        self.render(&self.texts.tick_request(TimeSpan::from_remaining(remaining_millis)));
        ControlFlow::Continue(())
    }

    /// Completes the countdown if it still belongs to the live schedule.
    fn finish(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation != generation || state.phase != TimerPhase::Running {
            return;
        }

        // The task is finishing on its own; dropping the handle detaches it.
        state.countdown = None;
        state.reset();
        state.completed_count += 1;

        tracing::info!(
            selector = state.selector_index,
            completed = state.completed_count,
            "countdown finished"
        );
        self.render_completion();
        self.broadcaster.publish(state.snapshot());
    }
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Countdown engine that owns the tick schedule and publishes snapshots.
///
/// At most one schedule is live at a time. Dropping the engine cancels it.
pub struct TimerEngine {
    shared: Arc<EngineShared>,
    period: Duration,
    runtime: Handle,
}

impl TimerEngine {
    /// Creates an idle engine on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `HostUnavailable` when called outside a tokio runtime.
    pub fn new(
        notifier: Arc<dyn NotificationScheduler>,
        texts: NotificationTexts,
        period: Duration,
    ) -> Result<Self, TimerError> {
        let runtime =
            Handle::try_current().map_err(|e| TimerError::HostUnavailable(e.to_string()))?;
        Ok(Self::with_runtime(runtime, notifier, texts, period))
    }

    /// Creates an idle engine whose ticks run on `runtime`.
    pub fn with_runtime(
        runtime: Handle,
        notifier: Arc<dyn NotificationScheduler>,
        texts: NotificationTexts,
        period: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                state: Mutex::new(EngineState::default()),
                broadcaster: StateBroadcaster::new(TimerState::default()),
                notifier,
                texts,
            }),
            period: period.max(Duration::from_millis(1)),
            runtime,
        }
    }

    /// Starts counting down `duration_millis` for the selector at `selector_index`.
    ///
    /// Any live schedule is cancelled first. Starting from `Paused` continues
    /// the paused countdown under the same number; any other start begins a
    /// new one. A zero duration completes on the next scheduler turn.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDuration` for a negative duration, and a permission
    /// error if notifications cannot be shown. The engine is left untouched
    /// in both cases.
    pub fn start(&self, duration_millis: i64, selector_index: usize) -> Result<(), TimerError> {
        if duration_millis < 0 {
            return Err(TimerError::InvalidDuration(duration_millis));
        }
        if !self.shared.notifier.is_available() {
            return Err(NotificationError::PermissionDenied.into());
        }

        let mut state = self.shared.lock();
        state.cancel_countdown();
        if state.phase != TimerPhase::Paused {
            state.countdown_number = state.started_count;
            state.started_count += 1;
        }
        state.phase = TimerPhase::Running;
        state.remaining_millis = duration_millis;
        state.selector_index = selector_index;
        self.shared.broadcaster.publish(state.snapshot());

        let generation = state.generation;
        let tick_shared = Arc::downgrade(&self.shared);
        let finish_shared = Weak::clone(&tick_shared);
        state.countdown = Some(Countdown::start(
            &self.runtime,
            duration_millis,
            self.period,
            move |remaining| match tick_shared.upgrade() {
                Some(shared) => shared.tick(generation, remaining),
                None => ControlFlow::Break(()),
            },
            move || {
                if let Some(shared) = finish_shared.upgrade() {
                    shared.finish(generation);
                }
            },
        ));

        tracing::info!(
            duration_ms = duration_millis,
            selector = selector_index,
            countdown = state.countdown_number,
            "countdown started"
        );
        Ok(())
    }

    /// Pauses the countdown and returns the remaining milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` unless a countdown is running.
    pub fn pause(&self) -> Result<i64, TimerError> {
        let mut state = self.shared.lock();
        if state.phase != TimerPhase::Running {
            return Err(TimerError::NotRunning);
        }

        state.cancel_countdown();
        state.phase = TimerPhase::Paused;
        self.shared.broadcaster.publish(state.snapshot());

        tracing::info!(remaining_ms = state.remaining_millis, "countdown paused");
        Ok(state.remaining_millis)
    }

    /// Stops a running or paused countdown.
    ///
    /// Stopping raises the same loud notification as a natural finish.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` if the engine is idle; nothing is published or
    /// rendered in that case.
    pub fn stop(&self) -> Result<(), TimerError> {
        let mut state = self.shared.lock();
        if state.phase == TimerPhase::Idle {
            return Err(TimerError::NotRunning);
        }

        state.cancel_countdown();
        state.reset();
        self.shared.broadcaster.publish(state.snapshot());
        self.shared.render_completion();

        tracing::info!(selector = state.selector_index, "countdown stopped");
        Ok(())
    }

    /// Returns the latest published snapshot.
    pub fn state(&self) -> TimerState {
        self.shared.broadcaster.current()
    }

    pub fn phase(&self) -> TimerPhase {
        self.shared.lock().phase
    }

    /// Last computed remaining time. Kept while paused.
    pub fn remaining_millis(&self) -> i64 {
        self.shared.lock().remaining_millis
    }

    /// Number of countdowns that ran to zero.
    pub fn completed_count(&self) -> u64 {
        self.shared.lock().completed_count
    }

    pub fn subscribe(&self) -> StateSubscription {
        self.shared.broadcaster.subscribe()
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.shared.lock().cancel_countdown();
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state())
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
