//! Focus Timer Library
//!
//! Background core of a work/rest focus timer. It includes:
//! - Countdown engine, state broadcast and long-lived timer host
//! - UI-side screen controller that re-attaches to a running countdown
//! - Named duration selectors with persisted lengths
//! - Notification rendering through a pluggable scheduler
//! - Configuration, CLI parsing and terminal display utilities

pub mod cli;
pub mod config;
pub mod daemon;
pub mod notification;
pub mod screen;
pub mod selector;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{TimeSpan, TimerPhase, TimerState};

pub use config::{ConfigError, SelectorConfig, TimerConfig};

pub use daemon::{Attachment, HostId, HostRegistry, TimerEngine, TimerError, TimerHost};

pub use notification::{
    ChannelKind, MockNotificationScheduler, NotificationError, NotificationScheduler,
    NotificationTexts, RenderRequest, TracingNotifier,
};

pub use screen::{ControlLayout, RecordingView, TimerScreen, TimerView};

pub use selector::{
    Color, DurationSelector, DurationStore, JsonFileStore, MemoryStore, SelectorSet, StoreError,
};
