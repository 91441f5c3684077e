//! The task screen's state container.
//!
//! [`TasksViewModel`] wires [`TasksReducer`] into a [`Store`] and exposes the
//! three things a screen needs: observable [`TasksState`], a way to dispatch
//! [`TasksAction`]s, and a stream of one-shot [`UiEffect`]s.

use crate::reducer::{TasksEnvironment, TasksReducer};
use crate::repository::TaskRepository;
use crate::types::{TasksAction, TasksState, UiEffect};
use std::sync::Arc;
use std::time::Duration;
use tasklist_runtime::{EffectHandle, SideEffectReceiver, SideEffectSender, Store, StoreError};
use tokio::sync::watch;

/// Store specialised to the task screen
pub type TasksStore = Store<TasksState, TasksAction, TasksEnvironment, TasksReducer>;

/// State container for the task screen
///
/// Construction dispatches [`TasksAction::GetTasks`], so the screen starts
/// loading immediately. Side effects go to the most recent subscriber; to see
/// the ones produced by the initial load, subscribe on the environment's
/// sender before calling [`TasksViewModel::with_environment`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tasklist::collection::InMemoryCollection;
/// use tasklist::repository::CollectionTaskRepository;
/// use tasklist::types::TasksAction;
/// use tasklist::view_model::TasksViewModel;
/// use tasklist_core::environment::SystemClock;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repository = CollectionTaskRepository::new(
///     Arc::new(InMemoryCollection::new("tasks")),
///     Arc::new(SystemClock),
/// );
/// let mut view_model = TasksViewModel::new(Arc::new(repository)).await?;
/// view_model.wait_until_loaded(Duration::from_secs(1)).await?;
///
/// view_model
///     .dispatch(TasksAction::OnChangeAddTaskDialogState { show: true })
///     .await?;
/// assert!(view_model.state().await.show_add_task_dialog);
/// # Ok(())
/// # }
/// ```
pub struct TasksViewModel {
    store: TasksStore,
    side_effects: SideEffectSender<UiEffect>,
    initial_load: EffectHandle,
}

impl TasksViewModel {
    /// Create a view model over `repository` and start the initial load
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the initial load cannot be dispatched.
    pub async fn new(repository: Arc<dyn TaskRepository>) -> Result<Self, StoreError> {
        Self::with_environment(TasksEnvironment::new(repository)).await
    }

    /// Create a view model with a prepared environment and start the initial load
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the initial load cannot be dispatched.
    pub async fn with_environment(env: TasksEnvironment) -> Result<Self, StoreError> {
        let side_effects = env.side_effects.clone();
        let store = Store::new(TasksState::new(), TasksReducer::new(), env);
        let initial_load = store.send(TasksAction::GetTasks).await?;
        tracing::debug!("Task screen created, initial load started");

        Ok(Self {
            store,
            side_effects,
            initial_load,
        })
    }

    /// Receive side effects from now on, detaching any earlier subscriber
    #[must_use]
    pub fn subscribe_effects(&self) -> SideEffectReceiver<UiEffect> {
        self.side_effects.subscribe()
    }

    /// Observe state changes; read [`TasksViewModel::state`] when it ticks
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<u64> {
        self.store.subscribe_state_changes()
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> TasksState {
        self.store.state(TasksState::clone).await
    }

    /// Read part of the state without cloning all of it
    pub async fn state_with<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&TasksState) -> T,
    {
        self.store.state(f).await
    }

    /// Dispatch an event
    ///
    /// Returns once the event has been reduced; the handle tracks the
    /// repository call it started, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`TasksViewModel::shutdown`].
    pub async fn dispatch(&self, action: TasksAction) -> Result<EffectHandle, StoreError> {
        tracing::debug!(?action, "Dispatching");
        self.store.send(action).await
    }

    /// Dispatch an event and wait until a matching result action has been reduced
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if nothing matches in time, or any
    /// error from [`TasksViewModel::dispatch`].
    pub async fn dispatch_and_wait_for<F>(
        &self,
        action: TasksAction,
        predicate: F,
        timeout: Duration,
    ) -> Result<TasksAction, StoreError>
    where
        F: Fn(&TasksAction) -> bool,
    {
        self.store.send_and_wait_for(action, predicate, timeout).await
    }

    /// Wait until the load started at construction has been reduced
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the load is still running after `timeout`.
    pub async fn wait_until_loaded(&mut self, timeout: Duration) -> Result<(), StoreError> {
        self.initial_load.wait_with_timeout(timeout).await
    }

    /// Stop accepting events and wait for running repository calls
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if calls are still running after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }
}

impl std::fmt::Debug for TasksViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TasksViewModel")
            .field("pending_effects", &self.store.pending_effects())
            .field("initial_load", &self.initial_load)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::InMemoryCollection;
    use crate::repository::CollectionTaskRepository;
    use tasklist_testing::test_clock;

    fn repository(collection: &InMemoryCollection) -> Arc<dyn TaskRepository> {
        Arc::new(CollectionTaskRepository::new(
            Arc::new(collection.clone()),
            Arc::new(test_clock()),
        ))
    }

    #[tokio::test]
    async fn construction_starts_loading() {
        let collection = InMemoryCollection::new("tasks");
        collection.set_latency(Duration::from_millis(50));

        let mut view_model = TasksViewModel::new(repository(&collection)).await.unwrap();
        assert!(view_model.state_with(|s| s.is_loading).await);

        view_model.wait_until_loaded(Duration::from_secs(2)).await.unwrap();
        assert!(!view_model.state_with(|s| s.is_loading).await);
    }

    #[tokio::test]
    async fn dispatch_after_shutdown_is_rejected() {
        let collection = InMemoryCollection::new("tasks");
        let view_model = TasksViewModel::new(repository(&collection)).await.unwrap();
        view_model.shutdown(Duration::from_secs(2)).await.unwrap();

        let result = view_model.dispatch(TasksAction::GetTasks).await;
        assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
    }

    #[tokio::test]
    async fn state_changes_tick_on_dispatch() {
        let collection = InMemoryCollection::new("tasks");
        let mut view_model = TasksViewModel::new(repository(&collection)).await.unwrap();
        view_model.wait_until_loaded(Duration::from_secs(2)).await.unwrap();

        let mut changes = view_model.state_changes();
        changes.mark_unchanged();
        view_model
            .dispatch(TasksAction::OnChangeTaskBody { text: "2%".to_string() })
            .await
            .unwrap();

        assert!(changes.has_changed().unwrap());
        assert_eq!(view_model.state().await.task_body, "2%");
    }
}
