//! Repository outcomes.
//!
//! Every repository call resolves to a [`Result`]; failures never escape as
//! panics. Timeouts and collection failures are kept apart so they can be
//! logged and counted separately, while the UI only shows the message.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Outcome of a repository call
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// The repository operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Inserting a new task
    AddTask,
    /// Listing every task
    GetAllTasks,
    /// Deleting a task by id
    DeleteTask,
    /// Updating title and body of a task
    UpdateTask,
}

impl Operation {
    /// Stable label for logs and metrics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddTask => "add_task",
            Self::GetAllTasks => "get_all_tasks",
            Self::DeleteTask => "delete_task",
            Self::UpdateTask => "update_task",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a repository call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The collection did not answer within the repository timeout
    #[error("The request timed out after {} seconds", timeout.as_secs_f64())]
    Timeout {
        /// Operation that timed out
        operation: Operation,
        /// The bound that was exceeded
        timeout: Duration,
    },

    /// The collection reported an error (network, permission, malformed data)
    #[error("{message}")]
    Store {
        /// Operation that failed
        operation: Operation,
        /// Message reported by the collection
        message: String,
    },
}

impl RepositoryError {
    /// Operation the failure belongs to
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Timeout { operation, .. } | Self::Store { operation, .. } => *operation,
        }
    }

    /// Stable label of the failure kind for logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Store { .. } => "store",
        }
    }

    /// Message for the user, or `fallback` when the failure carries none
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}
