// Error types - validation, selection and persistence failures

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Rejected user input. Never mutates state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Task name is required")]
    EmptyName,
    #[error("Invalid date format '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Please enter a username")]
    EmptyUsername,
    #[error("Username must contain only letters and numbers")]
    InvalidUsername,
    #[error("Unknown priority '{0}'")]
    UnknownPriority(String),
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
    #[error("Unknown status '{0}'")]
    UnknownStatus(String),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to create data directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode tasks for {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to replace {path}")]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Please select a task first")]
    NoSelection,
    #[error("Could not save tasks: {0}")]
    Persistence(#[from] PersistenceError),
}

impl TaskError {
    pub fn is_persistence(&self) -> bool {
        matches!(self, TaskError::Persistence(_))
    }
}
