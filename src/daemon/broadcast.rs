//! Latest-value broadcast of timer snapshots.
//!
//! A single `tokio::sync::watch` slot: publishing overwrites it, subscribers
//! read the newest value. There is no queue, so slow or absent observers
//! never hold back the tick task.

use tokio::sync::watch;

use crate::types::TimerState;

/// Holds the latest [`TimerState`] and hands out subscriptions.
///
/// Only the engine publishes.
#[derive(Debug, Clone)]
pub struct StateBroadcaster {
    tx: watch::Sender<TimerState>,
}

impl StateBroadcaster {
    /// Creates a broadcaster holding `initial`.
    pub fn new(initial: TimerState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Overwrites the slot and wakes every subscriber.
    ///
    /// Succeeds with zero subscribers.
    pub fn publish(&self, state: TimerState) {
        self.tx.send_replace(state);
    }

    /// Returns the value in the slot.
    pub fn current(&self) -> TimerState {
        *self.tx.borrow()
    }

    /// Opens a subscription whose first read is the current slot value.
    pub fn subscribe(&self) -> StateSubscription {
        StateSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One observer's view of the broadcast.
///
/// Dropping it unsubscribes without affecting anyone else.
#[derive(Debug)]
pub struct StateSubscription {
    rx: watch::Receiver<TimerState>,
}

impl StateSubscription {
    /// Reads the current value and marks it seen.
    pub fn current(&mut self) -> TimerState {
        *self.rx.borrow_and_update()
    }

    /// Returns the newest value if it has not been seen yet.
    pub fn try_next(&mut self) -> Option<TimerState> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.current()),
            _ => None,
        }
    }

    /// Waits for the next unseen value.
    ///
    /// Returns `None` once the broadcaster is gone.
    pub async fn changed(&mut self) -> Option<TimerState> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_subscriber_sees_current() {
        let broadcaster = StateBroadcaster::new(TimerState::idle(0));
        broadcaster.publish(TimerState::running(3_000, 1));

        let mut late = broadcaster.subscribe();
        assert_eq!(late.current(), TimerState::running(3_000, 1));
        assert_eq!(late.try_next(), None);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let broadcaster = StateBroadcaster::new(TimerState::idle(0));
        assert_eq!(broadcaster.subscriber_count(), 0);

        broadcaster.publish(TimerState::running(1_000, 0));
        assert_eq!(broadcaster.current(), TimerState::running(1_000, 0));
    }

    #[test]
    fn test_slot_keeps_only_latest() {
        let broadcaster = StateBroadcaster::new(TimerState::idle(0));
        let mut sub = broadcaster.subscribe();

        broadcaster.publish(TimerState::running(3_000, 0));
        broadcaster.publish(TimerState::running(2_000, 0));

        assert_eq!(sub.try_next(), Some(TimerState::running(2_000, 0)));
        assert_eq!(sub.try_next(), None);
    }

    #[test]
    fn test_subscribers_are_independent() {
        let broadcaster = StateBroadcaster::new(TimerState::idle(0));
        let mut first = broadcaster.subscribe();
        let second = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        drop(second);
        broadcaster.publish(TimerState::running(5_000, 0));

        assert_eq!(broadcaster.subscriber_count(), 1);
        assert_eq!(first.try_next(), Some(TimerState::running(5_000, 0)));
        assert_eq!(broadcaster.current(), TimerState::running(5_000, 0));
    }

    #[tokio::test]
    async fn test_changed_wakes_on_publish() {
        let broadcaster = StateBroadcaster::new(TimerState::idle(0));
        let mut sub = broadcaster.subscribe();

        let publisher = broadcaster.clone();
        tokio::spawn(async move {
            publisher.publish(TimerState::running(9_000, 1));
        });

        assert_eq!(sub.changed().await, Some(TimerState::running(9_000, 1)));
    }

    #[tokio::test]
    async fn test_changed_ends_when_broadcaster_dropped() {
        let broadcaster = StateBroadcaster::new(TimerState::idle(0));
        let mut sub = broadcaster.subscribe();

        drop(broadcaster);
        assert_eq!(sub.changed().await, None);
    }
}
