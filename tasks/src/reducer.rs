//! Reducer logic for the task screen.
//!
//! UI events that need the repository flip the loading flag and return a
//! future effect; the repository result comes back as a `*Loaded`/`*Added`/...
//! action, which settles state and emits the user-facing message.

use crate::repository::TaskRepository;
use crate::types::{TasksAction, TasksState, UiEffect};
use std::sync::Arc;
use tasklist_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use tasklist_runtime::SideEffectSender;

/// Snackbar shown after a task was added
pub const TASK_ADDED: &str = "Task added successfully";
/// Snackbar shown after a task was deleted
pub const TASK_DELETED: &str = "Task deleted successfully";
/// Snackbar shown after a task was updated
pub const TASK_UPDATED: &str = "Task updated successfully";
/// Snackbar shown when an update is requested with no task selected
pub const NO_TASK_SELECTED: &str = "No task selected for update";

const LOAD_FAILED: &str = "An error occurred when getting your task";
const ADD_FAILED: &str = "An error occurred when adding task";
const DELETE_FAILED: &str = "An error occurred when deleting task";
const UPDATE_FAILED: &str = "An error occurred when updating task";

/// Environment dependencies for the task reducer
#[derive(Clone)]
pub struct TasksEnvironment {
    /// Where tasks are persisted
    pub repository: Arc<dyn TaskRepository>,
    /// Outlet for one-shot UI instructions
    pub side_effects: SideEffectSender<UiEffect>,
}

impl TasksEnvironment {
    /// Creates an environment with a fresh side-effect channel
    #[must_use]
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self {
            repository,
            side_effects: SideEffectSender::default(),
        }
    }
}

/// Reducer for the task screen
#[derive(Clone, Debug, Default)]
pub struct TasksReducer;

impl TasksReducer {
    /// Creates a new `TasksReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Effect that shows a snackbar
    fn snackbar(env: &TasksEnvironment, message: impl Into<String>) -> Effect<TasksAction> {
        let side_effects = env.side_effects.clone();
        let effect = UiEffect::snackbar(message);
        Effect::future(async move {
            side_effects.emit(effect);
            None
        })
    }

    /// Effect that reloads the task list
    fn refresh() -> Effect<TasksAction> {
        Effect::send(TasksAction::GetTasks)
    }
}

impl Reducer for TasksReducer {
    type State = TasksState;
    type Action = TasksAction;
    type Environment = TasksEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Repository calls ==========
            TasksAction::GetTasks => {
                state.begin_request();
                let repository = Arc::clone(&env.repository);
                smallvec![Effect::future(async move {
                    Some(TasksAction::TasksLoaded {
                        result: repository.get_all_tasks().await,
                    })
                })]
            },

            TasksAction::AddTask { title, body } => {
                state.begin_request();
                let repository = Arc::clone(&env.repository);
                smallvec![Effect::future(async move {
                    Some(TasksAction::TaskAdded {
                        result: repository.add_task(title, body).await,
                    })
                })]
            },

            TasksAction::DeleteTask { task_id } => {
                state.begin_request();
                let repository = Arc::clone(&env.repository);
                smallvec![Effect::future(async move {
                    Some(TasksAction::TaskDeleted {
                        result: repository.delete_task(task_id).await,
                    })
                })]
            },

            TasksAction::UpdateTask => {
                let Some(task_id) =
                    state.task_to_be_updated.as_ref().map(|task| task.task_id.clone())
                else {
                    return smallvec![Self::snackbar(env, NO_TASK_SELECTED)];
                };

                state.begin_request();
                let repository = Arc::clone(&env.repository);
                let title = state.task_title.clone();
                let body = state.task_body.clone();
                smallvec![Effect::future(async move {
                    Some(TasksAction::TaskUpdated {
                        result: repository.update_task(title, body, task_id).await,
                    })
                })]
            },

            // ========== Local edits ==========
            TasksAction::OnChangeAddTaskDialogState { show } => {
                state.show_add_task_dialog = show;
                SmallVec::new()
            },

            TasksAction::OnChangeUpdateTaskDialogState { show } => {
                state.show_update_task_dialog = show;
                SmallVec::new()
            },

            TasksAction::OnChangeTaskTitle { text } => {
                state.task_title = text;
                SmallVec::new()
            },

            TasksAction::OnChangeTaskBody { text } => {
                state.task_body = text;
                SmallVec::new()
            },

            TasksAction::SetTaskToBeUpdated { task } => {
                state.task_to_be_updated = Some(task);
                SmallVec::new()
            },

            // ========== Repository results ==========
            TasksAction::TasksLoaded { result } => {
                state.finish_request();
                match result {
                    Ok(tasks) => {
                        state.tasks = tasks;
                        SmallVec::new()
                    },
                    Err(error) => smallvec![Self::snackbar(env, error.user_message(LOAD_FAILED))],
                }
            },

            TasksAction::TaskAdded { result } => {
                state.finish_request();
                match result {
                    Ok(()) => {
                        state.clear_inputs();
                        state.show_add_task_dialog = false;
                        smallvec![Self::snackbar(env, TASK_ADDED), Self::refresh()]
                    },
                    Err(error) => smallvec![Self::snackbar(env, error.user_message(ADD_FAILED))],
                }
            },

            TasksAction::TaskDeleted { result } => {
                state.finish_request();
                match result {
                    Ok(()) => smallvec![Self::snackbar(env, TASK_DELETED), Self::refresh()],
                    Err(error) => smallvec![Self::snackbar(env, error.user_message(DELETE_FAILED))],
                }
            },

            TasksAction::TaskUpdated { result } => {
                state.finish_request();
                match result {
                    Ok(()) => {
                        state.clear_inputs();
                        state.show_update_task_dialog = false;
                        smallvec![Self::snackbar(env, TASK_UPDATED), Self::refresh()]
                    },
                    Err(error) => smallvec![Self::snackbar(env, error.user_message(UPDATE_FAILED))],
                }
            },
        }
    }
}
