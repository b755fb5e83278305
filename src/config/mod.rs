//! Focus timer configuration.
//!
//! The configuration is a JSON document. Every field has a default, so an
//! empty object (or no file at all) yields the stock work/rest setup:
//!
//! ```json
//! {
//!   "tick_interval_ms": 1000,
//!   "selectors": [
//!     { "name": "work", "minutes": 25, "active_color": "#4CAF50", "inactive_color": "#F44336" },
//!     { "name": "rest", "minutes": 5 }
//!   ],
//!   "notification": { "title": "Focus timer" },
//!   "store_path": "/home/me/.config/focus-timer/durations.json"
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notification::NotificationTexts;
use crate::selector::{Color, SelectorColors};
use crate::types::TimeSpan;

/// Default tick interval in milliseconds.
fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_active_color() -> Color {
    Color::rgb(0x4CAF50)
}

fn default_inactive_color() -> Color {
    Color::rgb(0xF44336)
}

fn default_selectors() -> Vec<SelectorConfig> {
    vec![
        SelectorConfig::new("work", TimeSpan::compose(0, 25, 0)),
        SelectorConfig::new("rest", TimeSpan::compose(0, 5, 0)),
    ]
}

// ============================================================================
// ConfigError
// ============================================================================

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but is not usable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SelectorConfig
// ============================================================================

/// One configured duration selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectorConfig {
    /// Display name and persistence key.
    pub name: String,

    /// Default hours used on first run.
    #[serde(default)]
    pub hours: u64,

    /// Default minutes used on first run (0-59).
    #[serde(default)]
    pub minutes: u64,

    /// Default seconds used on first run (0-59).
    #[serde(default)]
    pub seconds: u64,

    #[serde(default = "default_active_color")]
    pub active_color: Color,

    #[serde(default = "default_inactive_color")]
    pub inactive_color: Color,
}

impl SelectorConfig {
    /// Creates a selector config with stock colors.
    pub fn new(name: impl Into<String>, default: TimeSpan) -> Self {
        let c = default.components();
        Self {
            name: name.into(),
            hours: c.hours,
            minutes: c.minutes,
            seconds: c.seconds,
            active_color: default_active_color(),
            inactive_color: default_inactive_color(),
        }
    }

    /// The first-run default length.
    pub fn default_span(&self) -> TimeSpan {
        TimeSpan::compose(self.hours, self.minutes, self.seconds)
    }

    pub fn colors(&self) -> SelectorColors {
        SelectorColors {
            active: self.active_color,
            inactive: self.inactive_color,
        }
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Configuration for the focus timer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerConfig {
    /// Length of one tick; each tick subtracts exactly this much.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Selectors in cycling order.
    #[serde(default = "default_selectors")]
    pub selectors: Vec<SelectorConfig>,

    /// Notification wording.
    #[serde(default)]
    pub notification: NotificationTexts,

    /// Location of the duration store. `None` uses the user config dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            selectors: default_selectors(),
            notification: NotificationTexts::default(),
            store_path: None,
        }
    }
}

impl TimerConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TimerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = ?path, selectors = config.selectors.len(), "config loaded");
        Ok(config)
    }

    /// Sets the tick interval.
    pub fn with_tick_interval_ms(mut self, millis: u64) -> Self {
        self.tick_interval_ms = millis;
        self
    }

    /// Replaces the selectors.
    pub fn with_selectors(mut self, selectors: Vec<SelectorConfig>) -> Self {
        self.selectors = selectors;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        if self.selectors.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one selector is required".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for selector in &self.selectors {
            if selector.name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "selector names must not be empty".to_string(),
                ));
            }
            if !names.insert(selector.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate selector name '{}'",
                    selector.name
                )));
            }
            if selector.minutes >= 60 || selector.seconds >= 60 {
                return Err(ConfigError::Invalid(format!(
                    "selector '{}': minutes and seconds must be below 60",
                    selector.name
                )));
            }
            if TimeSpan::try_compose(selector.hours, selector.minutes, selector.seconds).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "selector '{}': duration is too long",
                    selector.name
                )));
            }
        }

        self.notification
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Tick interval as a duration.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}
