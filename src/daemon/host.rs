//! Timer host lifetime.
//!
//! A [`TimerHost`] owns the engine and outlives any single screen: screens
//! attach to it through a [`HostRegistry`] and may come and go while a
//! countdown keeps running. The registry tears the host down once the last
//! observer has detached and no countdown is running or paused.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use uuid::Uuid;

use super::broadcast::StateSubscription;
use super::error::TimerError;
use super::timer::TimerEngine;
use crate::config::TimerConfig;
use crate::notification::{NotificationScheduler, NotificationTexts};
use crate::types::TimerState;

// ============================================================================
// HostId
// ============================================================================

/// Identity of one host instance. A rebuilt host gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(Uuid);

impl HostId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// TimerHost
// ============================================================================

/// A paused countdown waiting to be resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PausedCountdown {
    remaining_millis: i64,
    selector_index: usize,
}

struct HostInner {
    id: HostId,
    engine: TimerEngine,
    selector_count: usize,
    paused: Mutex<Option<PausedCountdown>>,
    observers: AtomicUsize,
}

/// Long-lived owner of the timer engine.
///
/// Clones share the same host. Dropping the last clone cancels any countdown.
#[derive(Clone)]
pub struct TimerHost {
    inner: Arc<HostInner>,
}

impl TimerHost {
    /// Builds an idle host on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `HostUnavailable` outside a tokio runtime.
    pub fn new(
        notifier: Arc<dyn NotificationScheduler>,
        texts: NotificationTexts,
        tick_period: Duration,
        selector_count: usize,
    ) -> Result<Self, TimerError> {
        let engine = TimerEngine::new(notifier, texts, tick_period)?;
        let id = HostId::new();
        tracing::debug!(host = %id, "timer host created");

        Ok(Self {
            inner: Arc::new(HostInner {
                id,
                engine,
                selector_count,
                paused: Mutex::new(None),
                observers: AtomicUsize::new(0),
            }),
        })
    }

    /// Host operations are serialized by the paused-slot lock.
    fn control(&self) -> MutexGuard<'_, Option<PausedCountdown>> {
        self.inner
            .paused
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a fresh countdown.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSelector` for an unknown index, `AlreadyActive` while
    /// a countdown is running or paused, or whatever the engine refuses.
    pub fn start(&self, duration_millis: i64, selector_index: usize) -> Result<(), TimerError> {
        if selector_index >= self.inner.selector_count {
            return Err(TimerError::InvalidSelector(selector_index));
        }

        let mut paused = self.control();
        if paused.is_some() || !self.inner.engine.state().is_idle() {
            return Err(TimerError::AlreadyActive);
        }

        self.inner.engine.start(duration_millis, selector_index)?;
        *paused = None;
        Ok(())
    }

    /// Pauses the countdown and keeps its remaining time for [`resume`](Self::resume).
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` unless a countdown is running.
    pub fn pause(&self) -> Result<i64, TimerError> {
        let mut paused = self.control();
        let selector_index = self.inner.engine.state().active_selector_index();
        let remaining_millis = self.inner.engine.pause()?;

        *paused = Some(PausedCountdown {
            remaining_millis,
            selector_index,
        });
        Ok(remaining_millis)
    }

    /// Continues a paused countdown from where it stopped.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` if nothing is paused. If the engine refuses to
    /// restart, the paused value is kept.
    pub fn resume(&self) -> Result<(), TimerError> {
        let mut paused = self.control();
        let countdown = paused.ok_or(TimerError::NotRunning)?;

        self.inner
            .engine
            .start(countdown.remaining_millis, countdown.selector_index)?;
        *paused = None;
        Ok(())
    }

    /// Stops a running or paused countdown.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` if the host is idle.
    pub fn stop(&self) -> Result<(), TimerError> {
        let mut paused = self.control();
        self.inner.engine.stop()?;
        *paused = None;
        Ok(())
    }

    /// Remaining time of the paused countdown, if any.
    pub fn paused_remaining(&self) -> Option<i64> {
        self.control().map(|p| p.remaining_millis)
    }

    /// Opens a subscription to the state broadcast.
    pub fn state_stream(&self) -> StateSubscription {
        self.inner.engine.subscribe()
    }

    pub fn state(&self) -> TimerState {
        self.inner.engine.state()
    }

    /// Returns true if no countdown is running or paused.
    pub fn is_idle(&self) -> bool {
        self.state().is_idle() && self.paused_remaining().is_none()
    }

    pub fn id(&self) -> HostId {
        self.inner.id
    }

    pub fn selector_count(&self) -> usize {
        self.inner.selector_count
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.load(Ordering::SeqCst)
    }

    pub fn completed_count(&self) -> u64 {
        self.inner.engine.completed_count()
    }

    pub fn ptr_eq(&self, other: &TimerHost) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for TimerHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHost")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl Drop for HostInner {
    fn drop(&mut self) {
        tracing::debug!(host = %self.id, "timer host dropped");
    }
}

// ============================================================================
// HostRegistry
// ============================================================================

/// Creates the timer host on demand and decides when to tear it down.
pub struct HostRegistry {
    notifier: Arc<dyn NotificationScheduler>,
    texts: NotificationTexts,
    tick_period: Duration,
    selector_count: usize,
    slot: Mutex<Option<TimerHost>>,
}

impl HostRegistry {
    /// Creates an empty registry; no host exists until one is needed.
    pub fn new(config: &TimerConfig, notifier: Arc<dyn NotificationScheduler>) -> Arc<Self> {
        Arc::new(Self {
            notifier,
            texts: config.notification.clone(),
            tick_period: config.tick_interval(),
            selector_count: config.selectors.len(),
            slot: Mutex::new(None),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<TimerHost>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_or_create(slot: &mut Option<TimerHost>, registry: &Self) -> Result<TimerHost, TimerError> {
        if let Some(host) = slot.as_ref() {
            return Ok(host.clone());
        }
        let host = TimerHost::new(
            Arc::clone(&registry.notifier),
            registry.texts.clone(),
            registry.tick_period,
            registry.selector_count,
        )?;
        *slot = Some(host.clone());
        Ok(host)
    }

    /// Brings the host up ahead of the first observer.
    ///
    /// # Errors
    ///
    /// Returns `HostUnavailable` outside a tokio runtime.
    pub fn prewarm(&self) -> Result<TimerHost, TimerError> {
        let mut slot = self.lock();
        Self::get_or_create(&mut slot, self)
    }

    /// Attaches an observer, creating the host if needed.
    ///
    /// The returned attachment's subscription starts at the current state.
    ///
    /// # Errors
    ///
    /// Returns `HostUnavailable` outside a tokio runtime.
    pub fn attach(self: &Arc<Self>) -> Result<Attachment, TimerError> {
        let mut slot = self.lock();
        let host = Self::get_or_create(&mut slot, self)?;
        let observers = host.inner.observers.fetch_add(1, Ordering::SeqCst) + 1;
        let subscription = host.state_stream();
        drop(slot);

        tracing::debug!(host = %host.id(), observers, "observer attached");
        Ok(Attachment {
            guard: ObserverGuard {
                registry: Arc::downgrade(self),
                host: host.clone(),
            },
            subscription,
            host,
        })
    }

    /// Detaches an observer. Equivalent to dropping the attachment.
    pub fn detach(&self, attachment: Attachment) {
        drop(attachment);
    }

    /// Returns the live host, if any.
    pub fn current(&self) -> Option<TimerHost> {
        self.lock().clone()
    }

    pub fn is_alive(&self) -> bool {
        self.lock().is_some()
    }

    /// Tears the host down if it is unobserved and idle.
    ///
    /// Returns true if a host was torn down.
    pub fn reap(&self) -> bool {
        let mut slot = self.lock();
        let reclaimable = slot
            .as_ref()
            .is_some_and(|host| host.observer_count() == 0 && host.is_idle());
        if reclaimable {
            if let Some(host) = slot.take() {
                tracing::info!(host = %host.id(), "timer host torn down");
            }
        }
        reclaimable
    }

    fn release(&self, host: &TimerHost) {
        let slot = self.lock();
        let observers = host.inner.observers.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::debug!(host = %host.id(), observers, "observer detached");

        let is_current = slot.as_ref().is_some_and(|current| current.ptr_eq(host));
        drop(slot);
        if observers == 0 && is_current {
            self.reap();
        }
    }
}

impl fmt::Debug for HostRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRegistry")
            .field("host", &self.current())
            .field("tick_period", &self.tick_period)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Attachment
// ============================================================================

/// Decrements the observer count when dropped.
#[derive(Debug)]
struct ObserverGuard {
    registry: Weak<HostRegistry>,
    host: TimerHost,
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        match self.registry.upgrade() {
            Some(registry) => registry.release(&self.host),
            None => {
                self.host.inner.observers.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }
}

/// One observer's link to the host. Dropping it detaches without stopping
/// the countdown.
#[derive(Debug)]
pub struct Attachment {
    host: TimerHost,
    subscription: StateSubscription,
    guard: ObserverGuard,
}

impl Attachment {
    pub fn host(&self) -> &TimerHost {
        &self.host
    }

    pub fn subscription(&mut self) -> &mut StateSubscription {
        &mut self.subscription
    }

    pub fn host_id(&self) -> HostId {
        self.guard.host.id()
    }
}
