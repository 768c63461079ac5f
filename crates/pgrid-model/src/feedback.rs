//! Classification of failed requests into user-visible feedback.
//!
//! Nothing here retries. A failed request leaves prior state untouched and is
//! reported exactly once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const STATUS_FORBIDDEN: u16 = 403;

/// A failed request as seen by the grid's host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFailure {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Field-keyed validation messages from the server payload.
    #[serde(default, rename = "errors", skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: BTreeMap<String, String>,
}

/// What the user should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Messages rendered next to the named form fields.
    FieldErrors(BTreeMap<String, String>),
    /// Transient notification.
    Toast { message: String },
    /// Dedicated notification; cached session/permission data must be refreshed.
    PermissionDenied {
        message: String,
        refresh_session: bool,
    },
}

impl RequestFailure {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_field_error(
        mut self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.field_errors.insert(field.into(), message.into());
        self
    }

    /// Map this failure to feedback, using `generic` when the server sent no message.
    pub fn feedback(&self, generic: &str) -> Feedback {
        let message = self
            .message
            .clone()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| generic.to_string());
        if self.status == STATUS_FORBIDDEN {
            return Feedback::PermissionDenied {
                message,
                refresh_session: true,
            };
        }
        if !self.field_errors.is_empty() {
            return Feedback::FieldErrors(self.field_errors.clone());
        }
        Feedback::Toast { message }
    }
}
