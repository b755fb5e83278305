//! Display utilities for the focus timer CLI.
//!
//! This module provides formatted output for:
//! - Selector listings
//! - Countdown progress through [`TerminalView`]
//! - Success and error messages

use crate::screen::{ControlLayout, TimerView};
use crate::selector::{Color, DurationSelector, SelectorSet};
use crate::types::TimeSpan;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Lists every selector with its stored duration.
    pub fn show_selectors(selectors: &SelectorSet) {
        println!("Focus timer selectors");
        println!("─────────────────────");
        for selector in selectors.iter() {
            println!("{}", Self::selector_line(selector));
        }
    }

    /// Shows a success message for a duration edit.
    pub fn show_set_success(name: &str, duration: TimeSpan) {
        println!("* {name} set to {duration}");
    }

    /// Shows the countdown that is about to run.
    pub fn show_run_started(selector: &DurationSelector) {
        println!("> {} {}", selector.name(), selector.persisted());
    }

    /// Shows that the countdown ran to zero.
    pub fn show_finished(name: &str) {
        println!("* {name} finished");
    }

    /// Shows that the countdown was interrupted.
    pub fn show_stopped(name: &str) {
        println!("[] {name} stopped");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {message}");
    }

    /// Formats one selector row, marking the active selector.
    fn selector_line(selector: &DurationSelector) -> String {
        let marker = if selector.is_active() { '*' } else { ' ' };
        format!(
            "{marker} {:<12} {}  {}",
            selector.name(),
            selector.persisted(),
            selector.color()
        )
    }
}

// ============================================================================
// TerminalView
// ============================================================================

/// [`TimerView`] that prints the running countdown to stdout.
///
/// Only the active selector is printed; the rest of a redraw is skipped.
#[derive(Debug, Default)]
pub struct TerminalView {
    last_line: Option<String>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn print_once(&mut self, line: String) {
        if self.last_line.as_deref() != Some(line.as_str()) {
            println!("{line}");
            self.last_line = Some(line);
        }
    }
}

impl TimerView for TerminalView {
    fn show_layout(&mut self, layout: ControlLayout) {
        tracing::debug!(%layout, "layout changed");
    }

    fn show_selector(&mut self, _index: usize, selector: &DurationSelector) {
        if selector.is_active() {
            self.print_once(format!("  {} {}", selector.name(), selector.displayed()));
        }
    }

    fn show_background(&mut self, _color: Color) {}

    fn request_permission(&mut self) {
        Display::show_error("notifications are unavailable; allow them and try again");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimerConfig;
    use crate::selector::MemoryStore;

    fn selectors() -> SelectorSet {
        SelectorSet::from_config(&TimerConfig::default(), &MemoryStore::new()).unwrap()
    }

    // ------------------------------------------------------------------------
    // Display Tests
    // ------------------------------------------------------------------------

    mod display_tests {
        use super::*;

        #[test]
        fn test_selector_line_marks_active() {
            let set = selectors();

            let work = Display::selector_line(set.get(0).unwrap());
            let rest = Display::selector_line(set.get(1).unwrap());

            assert!(work.starts_with("* work"));
            assert!(work.contains("00:25:00"));
            assert!(work.ends_with("#FF4CAF50"));
            assert!(rest.starts_with("  rest"));
            assert!(rest.contains("00:05:00"));
            assert!(rest.ends_with("#FFF44336"));
        }

        #[test]
        fn test_show_messages() {
            // These should not panic
            Display::show_selectors(&selectors());
            Display::show_set_success("work", TimeSpan::compose(0, 50, 0));
            Display::show_finished("work");
            Display::show_stopped("work");
            Display::show_error("Test error message");
        }
    }

    // ------------------------------------------------------------------------
    // TerminalView Tests
    // ------------------------------------------------------------------------

    mod terminal_view_tests {
        use super::*;

        #[test]
        fn test_prints_only_active_selector() {
            let set = selectors();
            let mut view = TerminalView::new();

            view.show_selector(1, set.get(1).unwrap());
            assert!(view.last_line.is_none());

            view.show_selector(0, set.get(0).unwrap());
            assert_eq!(view.last_line.as_deref(), Some("  work 00:25:00"));
        }

        #[test]
        fn test_line_follows_displayed() {
            let mut set = selectors();
            let mut view = TerminalView::new();

            view.show_selector(0, set.active());
            set.active_mut().show_remaining(60_000);
            view.show_selector(0, set.active());

            assert_eq!(view.last_line.as_deref(), Some("  work 00:01:00"));
        }
    }
}
