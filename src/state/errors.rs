//! Shared user-visible error surface

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::Serialize;

/// One error shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserError {
    pub message: String,
    pub raised_at: DateTime<Local>,
}

/// Queue of errors waiting to be shown
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorState {
    pub raised: VecDeque<UserError>,
}

impl ErrorState {
    /// Queue an error for display
    pub fn raise(&mut self, message: impl Into<String>) {
        self.raised.push_back(UserError {
            message: message.into(),
            raised_at: Local::now(),
        });
    }

    /// Remove the oldest error, once the user has seen it
    pub fn dismiss(&mut self) -> Option<UserError> {
        self.raised.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_and_dismiss_in_order() {
        let mut errors = ErrorState::default();
        errors.raise("first");
        errors.raise("second");
        assert_eq!(errors.dismiss().map(|e| e.message).as_deref(), Some("first"));
        assert_eq!(errors.raised.len(), 1);
        assert_eq!(errors.raised[0].message, "second");
        errors.dismiss();
        assert!(errors.dismiss().is_none());
    }
}
