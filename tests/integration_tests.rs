//! Integration tests for the timer host and its observers.
//!
//! These tests drive the public API end to end on tokio's paused clock:
//! - Pause/resume arithmetic on the host
//! - Completion notifications and snapshots
//! - Observers detaching and re-attaching mid-countdown
//! - Screens cycling selectors backed by a JSON store

use std::sync::Arc;
use std::time::Duration;

use focus_timer::config::{SelectorConfig, TimerConfig};
use focus_timer::daemon::{HostRegistry, TimerError};
use focus_timer::notification::{ChannelKind, MockNotificationScheduler};
use focus_timer::screen::{ControlLayout, RecordingView, TimerScreen};
use focus_timer::selector::{DurationStore, JsonFileStore, MemoryStore, SelectorSet};
use focus_timer::types::{TimeSpan, TimerState};

// ============================================================================
// Test Helpers
// ============================================================================

fn config() -> TimerConfig {
    TimerConfig::default().with_selectors(vec![
        SelectorConfig::new("work", TimeSpan::from_secs(5)),
        SelectorConfig::new("rest", TimeSpan::from_secs(3)),
    ])
}

fn create_registry() -> (Arc<HostRegistry>, Arc<MockNotificationScheduler>) {
    let notifier = Arc::new(MockNotificationScheduler::new());
    (HostRegistry::new(&config(), notifier.clone()), notifier)
}

fn create_screen(
    registry: &Arc<HostRegistry>,
    store: Arc<dyn DurationStore>,
) -> TimerScreen<RecordingView> {
    let selectors = SelectorSet::from_config(&config(), store.as_ref()).unwrap();
    TimerScreen::attach(registry, selectors, store, RecordingView::new()).unwrap()
}

/// Sleeps on the paused clock; the runtime auto-advances through every tick
/// due before the deadline.
async fn sleep_ms(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

// ============================================================================
// Host Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_pause_after_one_tick_returns_remaining() {
    let (registry, _) = create_registry();
    let attachment = registry.attach().unwrap();
    let host = attachment.host().clone();

    host.start(5_000, 0).unwrap();
    sleep_ms(1_500).await;

    assert_eq!(host.pause().unwrap(), 4_000);
    assert_eq!(host.state(), TimerState::paused(0));
}

#[tokio::test(start_paused = true)]
async fn test_resume_publishes_paused_value_next() {
    let (registry, _) = create_registry();
    let mut attachment = registry.attach().unwrap();
    let host = attachment.host().clone();

    host.start(5_000, 1).unwrap();
    sleep_ms(1_500).await;
    host.pause().unwrap();
    attachment.subscription().current();

    host.resume().unwrap();

    assert_eq!(
        attachment.subscription().try_next(),
        Some(TimerState::running(4_000, 1))
    );
}

#[tokio::test(start_paused = true)]
async fn test_completion_is_reported_once() {
    let (registry, notifier) = create_registry();
    let mut attachment = registry.attach().unwrap();
    attachment.host().start(3_000, 0).unwrap();

    let mut idle_snapshots = 0;
    let mut running_snapshots = Vec::new();
    while let Some(state) = attachment.subscription().changed().await {
        if state.is_idle() {
            idle_snapshots += 1;
            break;
        }
        running_snapshots.push(state.remaining_millis());
    }
    sleep_ms(5_000).await;

    assert_eq!(running_snapshots, vec![3_000, 2_000, 1_000]);
    assert_eq!(idle_snapshots, 1);
    assert_eq!(attachment.subscription().try_next(), None);
    assert_eq!(notifier.loud_count(), 1);
    assert_eq!(notifier.silent_count(), 2);
    assert_eq!(attachment.host().completed_count(), 1);

    let completion = notifier.last(ChannelKind::Loud).unwrap();
    assert_eq!(completion.tap.screen, "pomodoro");
}

#[tokio::test(start_paused = true)]
async fn test_late_observer_sees_running_state() {
    let (registry, _) = create_registry();
    let first = registry.attach().unwrap();
    first.host().start(5_000, 1).unwrap();
    sleep_ms(2_500).await;

    let mut late = registry.attach().unwrap();

    assert_eq!(late.host_id(), first.host_id());
    assert_eq!(late.subscription().current(), TimerState::running(3_000, 1));
}

#[tokio::test(start_paused = true)]
async fn test_countdown_survives_all_observers_leaving() {
    let (registry, notifier) = create_registry();
    let attachment = registry.attach().unwrap();
    let id = attachment.host_id();
    attachment.host().start(5_000, 0).unwrap();
    sleep_ms(1_500).await;
    let before = attachment.host().state().remaining_millis();

    registry.detach(attachment);
    sleep_ms(2_000).await;

    let mut again = registry.attach().unwrap();
    let state = again.subscription().current();
    assert_eq!(again.host_id(), id);
    assert!(state.is_running());
    assert!(state.remaining_millis() < before);
    assert!(notifier.silent_count() >= 3);

    drop(again);
    sleep_ms(5_000).await;
    assert_eq!(notifier.loud_count(), 1);
    assert!(registry.reap());
}

#[tokio::test(start_paused = true)]
async fn test_host_rejects_second_start() {
    let (registry, _) = create_registry();
    let attachment = registry.attach().unwrap();
    let host = attachment.host();

    host.start(5_000, 0).unwrap();
    assert!(matches!(host.start(3_000, 1), Err(TimerError::AlreadyActive)));
    assert_eq!(host.state(), TimerState::running(5_000, 0));
}

// ============================================================================
// Screen Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_selectors_cycle_between_countdowns() {
    let (registry, _) = create_registry();
    let store: Arc<dyn DurationStore> = Arc::new(MemoryStore::new());
    let mut screen = create_screen(&registry, store);

    assert_eq!(screen.selectors().active_index(), 0);
    screen.change().unwrap();
    assert_eq!(screen.selectors().active_index(), 1);
    screen.change().unwrap();
    assert_eq!(screen.selectors().active_index(), 0);

    screen.start().unwrap();
    sleep_ms(5_500).await;
    screen.sync();
    assert_eq!(screen.selectors().active_index(), 1);

    screen.start().unwrap();
    sleep_ms(3_500).await;
    screen.sync();
    assert_eq!(screen.selectors().active_index(), 0);
    assert_eq!(screen.layout(), ControlLayout::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_stale_screen_catches_up_with_next_countdown() {
    let (registry, _) = create_registry();
    let store: Arc<dyn DurationStore> = Arc::new(MemoryStore::new());
    let mut driver = create_screen(&registry, store.clone());
    let mut stale = create_screen(&registry, store);

    driver.start().unwrap();
    stale.sync();

    // The work countdown ends and rest starts before the stale screen reads.
    sleep_ms(5_500).await;
    driver.sync();
    assert_eq!(driver.selectors().active_index(), 1);
    driver.start().unwrap();
    sleep_ms(1_500).await;
    stale.sync();

    let host_selector = stale.host().state().active_selector_index();
    assert_eq!(host_selector, 1);
    assert_eq!(stale.selectors().active_index(), 1);
    assert_eq!(stale.layout(), ControlLayout::Running);
    assert_eq!(
        stale.selectors().get(0).unwrap().displayed(),
        TimeSpan::from_secs(5)
    );
    assert_eq!(stale.selectors().active().displayed(), TimeSpan::from_secs(2));

    sleep_ms(2_000).await;
    stale.sync();
    driver.sync();
    assert_eq!(stale.selectors().active_index(), 0);
    assert_eq!(driver.selectors().active_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reopened_screen_resumes_paused_countdown() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn DurationStore> =
        Arc::new(JsonFileStore::new(dir.path().join("durations.json")));
    let (registry, notifier) = create_registry();

    let mut screen = create_screen(&registry, store.clone());
    screen.change().unwrap();
    screen.start().unwrap();
    sleep_ms(1_500).await;
    screen.pause().unwrap();
    drop(screen);

    let mut reopened = create_screen(&registry, store);
    assert_eq!(reopened.selectors().active_index(), 1);
    assert_eq!(reopened.layout(), ControlLayout::Paused);
    assert_eq!(reopened.selectors().active().displayed(), TimeSpan::from_secs(2));

    reopened.resume().unwrap();
    sleep_ms(2_500).await;
    reopened.sync();

    assert_eq!(reopened.layout(), ControlLayout::Idle);
    assert_eq!(reopened.selectors().active_index(), 0);
    assert_eq!(
        reopened.selectors().get(1).unwrap().displayed(),
        TimeSpan::from_secs(3)
    );
    assert_eq!(notifier.loud_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_edits_survive_new_screen() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn DurationStore> =
        Arc::new(JsonFileStore::new(dir.path().join("durations.json")));
    let (registry, _) = create_registry();

    let mut screen = create_screen(&registry, store.clone());
    screen.edit(0, TimeSpan::compose(0, 45, 0)).unwrap();
    drop(screen);

    let screen = create_screen(&registry, store);
    assert_eq!(
        screen.selectors().get(0).unwrap().persisted(),
        TimeSpan::compose(0, 45, 0)
    );
    assert_eq!(
        screen.selectors().get(1).unwrap().persisted(),
        TimeSpan::from_secs(3)
    );
}
