//! Duration selectors for the focus timer.
//!
//! A selector is one named countdown length ("work", "rest"). It keeps a
//! persisted default and a displayed value that ticks down while its
//! countdown runs. Selectors hold data only; drawing them is the job of a
//! [`TimerView`](crate::screen::TimerView).
//!
//! A [`SelectorSet`] holds the configured selectors in order and keeps
//! exactly one of them active.

mod error;
pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::TimerConfig;
use crate::daemon::TimerError;
use crate::types::TimeSpan;

pub use self::error::StoreError;
pub use self::store::{DurationStore, JsonFileStore, MemoryStore, StoredDuration};

// ============================================================================
// Color
// ============================================================================

/// An ARGB color, written as `#RRGGBB` or `#AARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    /// Returns the color with full opacity from an RGB triple.
    pub const fn rgb(rgb: u32) -> Self {
        Self(0xFF00_0000 | (rgb & 0x00FF_FFFF))
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("color '{s}' must start with '#'"))?;
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| format!("color '{s}' is not hexadecimal"))?;
        match hex.len() {
            6 => Ok(Color::rgb(value)),
            8 => Ok(Color(value)),
            _ => Err(format!("color '{s}' must be #RRGGBB or #AARRGGBB")),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

/// Styling of a selector in its two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorColors {
    pub active: Color,
    pub inactive: Color,
}

// ============================================================================
// DurationSelector
// ============================================================================

/// One named, independently persisted countdown duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationSelector {
    name: String,
    persisted: TimeSpan,
    displayed: TimeSpan,
    active: bool,
    colors: SelectorColors,
}

impl DurationSelector {
    /// Loads a selector from `store`, seeding it with `default` on first use.
    ///
    /// Missing individual fields are backfilled from `default` and written
    /// back. The selector starts inactive, displaying its persisted value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn load(
        name: impl Into<String>,
        default: TimeSpan,
        colors: SelectorColors,
        store: &dyn DurationStore,
    ) -> Result<Self, StoreError> {
        let name = name.into();
        let too_long = || StoreError::DurationTooLong(name.clone());
        let persisted = match store.load(&name)? {
            Some(stored) if stored.is_complete() => {
                stored.backfill(default).ok_or_else(too_long)?
            }
            Some(stored) => {
                let span = stored.backfill(default).ok_or_else(too_long)?;
                tracing::debug!(selector = %name, "backfilling partial duration record");
                store.save(&name, &StoredDuration::from_span(span))?;
                span
            }
            None => {
                store.save(&name, &StoredDuration::from_span(default))?;
                default
            }
        };

        Ok(Self {
            name,
            persisted,
            displayed: persisted,
            active: false,
            colors,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The durable default length.
    pub fn persisted(&self) -> TimeSpan {
        self.persisted
    }

    /// The length currently shown, possibly mid-countdown.
    pub fn displayed(&self) -> TimeSpan {
        self.displayed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn colors(&self) -> SelectorColors {
        self.colors
    }

    /// Color for the current activation state.
    pub fn color(&self) -> Color {
        if self.active {
            self.colors.active
        } else {
            self.colors.inactive
        }
    }

    /// Stores a user edit and shows it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails; nothing changes then.
    pub fn edit(&mut self, span: TimeSpan, store: &dyn DurationStore) -> Result<(), StoreError> {
        let stored = StoredDuration::from_span(span);
        let persisted = stored
            .backfill(TimeSpan::ZERO)
            .ok_or_else(|| StoreError::DurationTooLong(self.name.clone()))?;
        store.save(&self.name, &stored)?;
        self.persisted = persisted;
        self.displayed = persisted;
        Ok(())
    }

    /// Shows a countdown value. Never persisted.
    pub fn show_remaining(&mut self, remaining_millis: i64) {
        self.displayed = TimeSpan::from_remaining(remaining_millis);
    }

    /// Resets the displayed value to the persisted one.
    pub fn restore(&mut self) {
        self.displayed = self.persisted;
    }

    fn activate(&mut self) -> Color {
        self.active = true;
        self.colors.active
    }

    fn deactivate(&mut self) -> Color {
        self.active = false;
        self.colors.inactive
    }
}

// ============================================================================
// SelectorSet
// ============================================================================

/// Ordered selectors with exactly one active.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    selectors: Vec<DurationSelector>,
    active: usize,
}

impl SelectorSet {
    /// Builds a set and activates the first selector.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveSelector` if `selectors` is empty.
    pub fn new(mut selectors: Vec<DurationSelector>) -> Result<Self, TimerError> {
        if selectors.is_empty() {
            return Err(TimerError::NoActiveSelector);
        }
        for selector in selectors.iter_mut() {
            selector.deactivate();
        }
        selectors[0].activate();
        Ok(Self {
            selectors,
            active: 0,
        })
    }

    /// Loads every configured selector from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config has no selectors or the store fails.
    pub fn from_config(config: &TimerConfig, store: &dyn DurationStore) -> Result<Self, TimerError> {
        let selectors = config
            .selectors
            .iter()
            .map(|s| DurationSelector::load(&s.name, s.default_span(), s.colors(), store))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(selectors)
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Always false; a set cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DurationSelector> {
        self.selectors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DurationSelector> {
        self.selectors.iter()
    }

    /// Index of the selector named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.selectors.iter().position(|s| s.name == name)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &DurationSelector {
        &self.selectors[self.active]
    }

    pub fn active_mut(&mut self) -> &mut DurationSelector {
        &mut self.selectors[self.active]
    }

    /// Advances to the next selector, wrapping past the last.
    ///
    /// Returns the new active color.
    pub fn cycle(&mut self) -> Color {
        let next = (self.active + 1) % self.selectors.len();
        self.switch_to(next)
    }

    /// Makes `index` the active selector.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSelector` if there is no selector at `index`.
    pub fn activate(&mut self, index: usize) -> Result<Color, TimerError> {
        if index >= self.selectors.len() {
            return Err(TimerError::InvalidSelector(index));
        }
        Ok(self.switch_to(index))
    }

    /// Edits the persisted length of the selector at `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSelector` for a bad index or a store error.
    pub fn edit(
        &mut self,
        index: usize,
        span: TimeSpan,
        store: &dyn DurationStore,
    ) -> Result<(), TimerError> {
        let selector = self
            .selectors
            .get_mut(index)
            .ok_or(TimerError::InvalidSelector(index))?;
        selector.edit(span, store)?;
        Ok(())
    }

    // Both flips happen under one &mut borrow, so no caller can observe
    // zero or two active selectors.
    fn switch_to(&mut self, index: usize) -> Color {
        self.selectors[self.active].deactivate();
        self.active = index;
        self.selectors[index].activate()
    }
}
