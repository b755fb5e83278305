//! Notification system error types.
//!
//! Errors are split between conditions the user can fix (permission) and
//! presentation failures the timer simply logs and moves past.

use thiserror::Error;

/// Errors that can occur while rendering notifications.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// Notification permission was denied by the user.
    #[error("notification permission denied")]
    PermissionDenied,

    /// Failed to render a notification.
    #[error("failed to render notification: {0}")]
    SendFailed(String),

    /// The notification backend is not available.
    #[error("notification backend is not available")]
    NotAvailable,

    /// Invalid input provided to the notification system.
    #[error("invalid notification input: {0}")]
    InvalidInput(String),
}

impl NotificationError {
    /// Returns true if this error is related to permissions.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "allow notifications for the app in the system settings",
            Self::SendFailed(_) => "check the notification center",
            Self::NotAvailable => "restart the application",
            Self::InvalidInput(_) => "check the notification texts in the configuration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotificationError::PermissionDenied;
        assert_eq!(err.to_string(), "notification permission denied");

        let err = NotificationError::SendFailed("backend gone".to_string());
        assert!(err.to_string().contains("backend gone"));
    }

    #[test]
    fn test_is_permission_error() {
        assert!(NotificationError::PermissionDenied.is_permission_error());
        assert!(!NotificationError::NotAvailable.is_permission_error());
        assert!(!NotificationError::SendFailed("x".into()).is_permission_error());
    }

    #[test]
    fn test_suggestion() {
        assert!(NotificationError::PermissionDenied
            .suggestion()
            .contains("settings"));
    }
}
