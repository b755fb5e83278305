//! Notification content construction.
//!
//! The engine owns the wording; schedulers only present what they are
//! handed. Texts are configurable and default to the timer's stock strings.

use serde::{Deserialize, Serialize};

use crate::types::TimeSpan;

use super::{ChannelKind, NotificationError, RenderRequest, TapIntent};

/// Maximum length for any notification text.
const MAX_TEXT_LENGTH: usize = 200;

fn default_title() -> String {
    "Focus timer".to_string()
}

fn default_time_left_prefix() -> String {
    "Time left: ".to_string()
}

fn default_completion_title() -> String {
    "Time is up".to_string()
}

fn default_completion_body() -> String {
    "Your countdown has finished".to_string()
}

/// Texts used to build timer notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationTexts {
    /// Title of the ongoing countdown notification.
    #[serde(default = "default_title")]
    pub title: String,

    /// Prefix placed before the `HH:MM:SS` remaining time.
    #[serde(default = "default_time_left_prefix")]
    pub time_left_prefix: String,

    /// Title of the completion alert.
    #[serde(default = "default_completion_title")]
    pub completion_title: String,

    /// Body of the completion alert.
    #[serde(default = "default_completion_body")]
    pub completion_body: String,
}

impl Default for NotificationTexts {
    fn default() -> Self {
        Self {
            title: default_title(),
            time_left_prefix: default_time_left_prefix(),
            completion_title: default_completion_title(),
            completion_body: default_completion_body(),
        }
    }
}

impl NotificationTexts {
    /// Checks that every text is usable as notification content.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a title is empty or any text is too long.
    pub fn validate(&self) -> Result<(), NotificationError> {
        if self.title.trim().is_empty() || self.completion_title.trim().is_empty() {
            return Err(NotificationError::InvalidInput(
                "notification titles must not be empty".to_string(),
            ));
        }
        for text in [
            &self.title,
            &self.time_left_prefix,
            &self.completion_title,
            &self.completion_body,
        ] {
            if text.chars().count() > MAX_TEXT_LENGTH {
                return Err(NotificationError::InvalidInput(format!(
                    "notification text exceeds {MAX_TEXT_LENGTH} characters"
                )));
            }
        }
        Ok(())
    }

    /// Builds the silent per-tick update showing the remaining time.
    #[must_use]
    pub fn tick_request(&self, remaining: TimeSpan) -> RenderRequest {
        RenderRequest {
            channel: ChannelKind::Silent,
            title: self.title.clone(),
            body: format!("{}{}", self.time_left_prefix, remaining),
            tap: TapIntent::timer_view(),
        }
    }

    /// Builds the loud alert shown when a countdown ends or is stopped.
    #[must_use]
    pub fn completion_request(&self) -> RenderRequest {
        RenderRequest {
            channel: ChannelKind::Loud,
            title: self.completion_title.clone(),
            body: self.completion_body.clone(),
            tap: TapIntent::timer_view(),
        }
    }
}
