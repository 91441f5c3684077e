//! Domain types for the task list.
//!
//! The state is everything a task screen renders; actions are both the UI
//! events that drive it and the repository results fed back by effects.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A persisted to-do item
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier assigned by the collection on insert
    pub task_id: String,
    /// Short title
    pub title: String,
    /// Free-form body
    pub body: String,
    /// Creation time in display format (see [`crate::date`])
    pub created_at: String,
}

/// State of the task screen
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasksState {
    /// True while at least one repository call is in flight
    pub is_loading: bool,
    /// Tasks from the last successful load
    pub tasks: Vec<Task>,
    /// Add-task dialog visibility
    pub show_add_task_dialog: bool,
    /// Update-task dialog visibility
    pub show_update_task_dialog: bool,
    /// Title input buffer
    pub task_title: String,
    /// Body input buffer
    pub task_body: String,
    /// Task the update dialog edits
    pub task_to_be_updated: Option<Task>,
    #[serde(skip)]
    in_flight: usize,
}

impl TasksState {
    /// Creates the initial state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls currently in flight
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Returns a task by id
    #[must_use]
    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.task_id == task_id)
    }

    pub(crate) const fn begin_request(&mut self) {
        self.in_flight += 1;
        self.is_loading = true;
    }

    pub(crate) const fn finish_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.is_loading = self.in_flight > 0;
    }

    pub(crate) fn clear_inputs(&mut self) {
        self.task_title.clear();
        self.task_body.clear();
    }
}

/// Actions for the task screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TasksAction {
    // ========== UI events ==========
    /// Load every task
    GetTasks,

    /// Create a task
    AddTask {
        /// Title of the new task
        title: String,
        /// Body of the new task
        body: String,
    },

    /// Delete a task
    DeleteTask {
        /// Task to delete
        task_id: String,
    },

    /// Save the input buffers into the task being edited
    UpdateTask,

    /// Show or hide the add-task dialog
    OnChangeAddTaskDialogState {
        /// New visibility
        show: bool,
    },

    /// Show or hide the update-task dialog
    OnChangeUpdateTaskDialogState {
        /// New visibility
        show: bool,
    },

    /// Overwrite the title input buffer
    OnChangeTaskTitle {
        /// Buffer contents
        text: String,
    },

    /// Overwrite the body input buffer
    OnChangeTaskBody {
        /// Buffer contents
        text: String,
    },

    /// Select the task the update dialog edits
    SetTaskToBeUpdated {
        /// Selected task
        task: Task,
    },

    // ========== Repository results ==========
    /// `get_all_tasks` resolved
    TasksLoaded {
        /// Loaded tasks or the failure
        result: Result<Vec<Task>>,
    },

    /// `add_task` resolved
    TaskAdded {
        /// Outcome
        result: Result<()>,
    },

    /// `delete_task` resolved
    TaskDeleted {
        /// Outcome
        result: Result<()>,
    },

    /// `update_task` resolved
    TaskUpdated {
        /// Outcome
        result: Result<()>,
    },
}

/// One-shot instructions for the UI, not part of state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEffect {
    /// Show a transient message
    ShowSnackbar {
        /// Text to show
        message: String,
    },
}

impl UiEffect {
    /// Snackbar side effect
    #[must_use]
    pub fn snackbar(message: impl Into<String>) -> Self {
        Self::ShowSnackbar {
            message: message.into(),
        }
    }
}
