//! Repeating countdown schedule.
//!
//! A [`Countdown`] is a tokio task that walks a logical countdown in fixed
//! steps and calls back into its owner:
//!
//! - `on_tick(remaining)` after every step that leaves time on the clock
//! - `on_finish()` once the countdown reaches zero
//!
//! Steps are scheduled against absolute deadlines, so a late wakeup does not
//! push later ticks back. The remaining value always drops by exactly one
//! period per tick; only the final step may be shorter, when the duration is
//! not a whole number of periods.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Handle to a running countdown task.
///
/// Dropping the handle detaches the task; call [`Countdown::cancel`] to stop it.
#[derive(Debug)]
pub struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Spawns a countdown of `duration_millis` on `runtime`.
    ///
    /// `on_tick` returning `ControlFlow::Break` ends the countdown without
    /// calling `on_finish`.
    pub fn start<T, F>(
        runtime: &Handle,
        duration_millis: i64,
        period: Duration,
        mut on_tick: T,
        on_finish: F,
    ) -> Self
    where
        T: FnMut(i64) -> ControlFlow<()> + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        let step = i64::try_from(period.as_millis()).unwrap_or(i64::MAX).max(1);

        let handle = runtime.spawn(async move {
            let mut remaining = duration_millis.max(0);
            let mut deadline = Instant::now();

            while remaining > 0 {
                let wait = step.min(remaining);
                deadline += Duration::from_millis(wait as u64);
                sleep_until(deadline).await;
                remaining -= wait;

                if remaining > 0 && on_tick(remaining).is_break() {
                    return;
                }
            }

            on_finish();
        });

        Self { handle }
    }

    /// Aborts the task. No callback runs after the next await point.
    pub fn cancel(self) {
        self.handle.abort();
    }

    /// Returns true if the task has finished or was aborted.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
