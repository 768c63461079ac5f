//! Persistence error types.
//!
//! Store operations return structured errors with a user-facing message and
//! an optional remediation hint.

use std::path::PathBuf;

use thiserror::Error;

use crate::session::grid_name;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to {operation} view-state file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Keys become file names and must not be empty.
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),

    #[error("failed to serialize view state for `{key}`")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored view state for `{key}` is not valid")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to complete view-state save")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} the file at {}", operation, path.display()),
            Self::InvalidKey(key) => format!("'{key}' cannot be used as a grid name for saving"),
            Self::Serialization { key, .. } => {
                format!("The layout of grid '{key}' could not be saved.")
            }
            Self::Deserialization { key, .. } => {
                format!("The saved layout '{key}' is damaged and was not applied.")
            }
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not save the grid layout to {}. Please check disk space and permissions.",
                target_path.display()
            ),
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the state directory exists and is readable.".into())
                } else {
                    Some("Check that you have permission to write to the state directory.".into())
                }
            }
            Self::InvalidKey(_) => {
                Some("Give the grid a non-empty name.".into())
            }
            Self::Serialization { .. } => None,
            Self::Deserialization { key, .. } => {
                let name = grid_name(key).unwrap_or(key.as_str());
                Some(format!("Run `pgrid state clear {name}` to reset the layout."))
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or choose another state directory.".into())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damaged_state_suggestion_names_the_grid() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = PersistenceError::Deserialization {
            key: "gridState-emp_list".to_string(),
            source,
        };
        assert_eq!(
            error.suggestion().as_deref(),
            Some("Run `pgrid state clear emp_list` to reset the layout.")
        );
    }
}
