//! End-to-end tests for the task screen
//!
//! Drives `TasksViewModel` over an in-memory collection and observes state
//! and side effects the way a screen would.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::Arc;
use std::time::Duration;
use tasklist::collection::{CollectionError, Fields, InMemoryCollection};
use tasklist::reducer::{NO_TASK_SELECTED, TASK_ADDED, TASK_DELETED, TASK_UPDATED};
use tasklist::{
    CollectionTaskRepository, TasksAction, TasksEnvironment, TasksViewModel, UiEffect,
};
use tasklist_runtime::{SideEffectReceiver, StoreError};
use tasklist_testing::helpers::{init_test_tracing, next_side_effect};
use tasklist_testing::test_clock;

const WAIT: Duration = Duration::from_secs(2);

// ============================================================================
// Test Fixtures
// ============================================================================

fn repository(collection: &InMemoryCollection, timeout: Duration) -> CollectionTaskRepository {
    CollectionTaskRepository::new(Arc::new(collection.clone()), Arc::new(test_clock()))
        .with_timeout(timeout)
}

async fn loaded_view_model(
    collection: &InMemoryCollection,
) -> (TasksViewModel, SideEffectReceiver<UiEffect>) {
    init_test_tracing();
    let repository = repository(collection, Duration::from_secs(10));
    let mut view_model = TasksViewModel::new(Arc::new(repository)).await.unwrap();
    view_model.wait_until_loaded(WAIT).await.unwrap();
    let effects = view_model.subscribe_effects();
    (view_model, effects)
}

fn refreshed(action: &TasksAction) -> bool {
    matches!(action, TasksAction::TasksLoaded { .. })
}

fn seeded(id: &str, title: &str) -> (String, Fields) {
    (
        id.to_string(),
        Fields::from([
            ("title".to_string(), title.to_string()),
            ("body".to_string(), "body".to_string()),
            ("createdAt".to_string(), "2025-01-01 08:00:00".to_string()),
        ]),
    )
}

async fn snackbar(effects: &mut SideEffectReceiver<UiEffect>) -> String {
    match next_side_effect(effects, WAIT).await {
        Some(UiEffect::ShowSnackbar { message }) => message,
        None => panic!("expected a snackbar"),
    }
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn initial_load_populates_tasks() {
    let collection = InMemoryCollection::new("tasks");
    let (id, fields) = seeded("t1", "Existing");
    collection.seed(id, fields);

    let (view_model, _effects) = loaded_view_model(&collection).await;

    let state = view_model.state().await;
    assert!(!state.is_loading);
    assert_eq!(state.tasks.len(), 1);
    assert_eq!(state.tasks[0].title, "Existing");
    assert_eq!(state.tasks[0].created_at, "Wednesday January 2025, 8:00AM");
}

#[tokio::test]
async fn initial_load_failure_is_reported() {
    let collection = InMemoryCollection::new("tasks");
    collection.fail_with(Some(CollectionError::Unavailable("offline".to_string())));

    let env = TasksEnvironment::new(Arc::new(repository(&collection, Duration::from_secs(10))));
    let mut effects = env.side_effects.subscribe();
    let mut view_model = TasksViewModel::with_environment(env).await.unwrap();
    view_model.wait_until_loaded(WAIT).await.unwrap();

    assert_eq!(snackbar(&mut effects).await, "offline");
    let state = view_model.state().await;
    assert!(!state.is_loading);
    assert!(state.tasks.is_empty());
}

#[tokio::test]
async fn initial_load_timeout_is_reported() {
    let collection = InMemoryCollection::new("tasks");
    collection.set_latency(Duration::from_millis(500));

    let env = TasksEnvironment::new(Arc::new(repository(&collection, Duration::from_millis(20))));
    let mut effects = env.side_effects.subscribe();
    let mut view_model = TasksViewModel::with_environment(env).await.unwrap();
    view_model.wait_until_loaded(WAIT).await.unwrap();

    assert_eq!(snackbar(&mut effects).await, "The request timed out after 0.02 seconds");
    assert!(!view_model.state_with(|s| s.is_loading).await);
}

// ============================================================================
// Add
// ============================================================================

#[tokio::test]
async fn add_task_end_to_end() {
    let collection = InMemoryCollection::new("tasks");
    collection.set_latency(Duration::from_millis(30));
    let (view_model, mut effects) = loaded_view_model(&collection).await;

    view_model
        .dispatch(TasksAction::OnChangeAddTaskDialogState { show: true })
        .await
        .unwrap();
    view_model
        .dispatch(TasksAction::OnChangeTaskTitle {
            text: "Buy milk".to_string(),
        })
        .await
        .unwrap();
    view_model
        .dispatch(TasksAction::OnChangeTaskBody { text: "2%".to_string() })
        .await
        .unwrap();

    view_model
        .dispatch(TasksAction::AddTask {
            title: "Buy milk".to_string(),
            body: "2%".to_string(),
        })
        .await
        .unwrap();
    assert!(view_model.state_with(|s| s.is_loading).await);

    // Settles after the add's own result and the refresh it triggers
    let mut changes = view_model.state_changes();
    while !view_model.state_with(|s| !s.is_loading && !s.tasks.is_empty()).await {
        tokio::time::timeout(WAIT, changes.changed()).await.unwrap().unwrap();
    }

    let state = view_model.state().await;
    assert!(!state.show_add_task_dialog);
    assert!(state.task_title.is_empty());
    assert!(state.task_body.is_empty());
    assert_eq!(state.tasks.len(), 1);
    assert_eq!(state.tasks[0].title, "Buy milk");
    assert_eq!(state.tasks[0].body, "2%");

    assert_eq!(snackbar(&mut effects).await, TASK_ADDED);
}

#[tokio::test]
async fn failed_add_keeps_dialog_and_inputs() {
    let collection = InMemoryCollection::new("tasks");
    let (view_model, mut effects) = loaded_view_model(&collection).await;
    collection.fail_with(Some(CollectionError::PermissionDenied("read only".to_string())));

    view_model
        .dispatch(TasksAction::OnChangeAddTaskDialogState { show: true })
        .await
        .unwrap();
    view_model
        .dispatch(TasksAction::OnChangeTaskTitle {
            text: "Buy milk".to_string(),
        })
        .await
        .unwrap();

    let result = view_model
        .dispatch_and_wait_for(
            TasksAction::AddTask {
                title: "Buy milk".to_string(),
                body: String::new(),
            },
            |action| matches!(action, TasksAction::TaskAdded { .. }),
            WAIT,
        )
        .await
        .unwrap();
    assert!(matches!(result, TasksAction::TaskAdded { result: Err(_) }));

    assert_eq!(snackbar(&mut effects).await, "Permission denied: read only");
    let state = view_model.state().await;
    assert!(!state.is_loading);
    assert!(state.show_add_task_dialog);
    assert_eq!(state.task_title, "Buy milk");
    assert!(state.tasks.is_empty());
}

// ============================================================================
// Delete and Update
// ============================================================================

#[tokio::test]
async fn delete_task_refreshes_list() {
    let collection = InMemoryCollection::new("tasks");
    let (id, fields) = seeded("t1", "Old");
    collection.seed(id, fields);
    let (view_model, mut effects) = loaded_view_model(&collection).await;

    view_model
        .dispatch_and_wait_for(
            TasksAction::DeleteTask {
                task_id: "t1".to_string(),
            },
            refreshed,
            WAIT,
        )
        .await
        .unwrap();

    assert_eq!(snackbar(&mut effects).await, TASK_DELETED);
    let state = view_model.state().await;
    assert!(state.tasks.is_empty());
    assert!(!state.is_loading);
}

#[tokio::test]
async fn deleting_missing_task_reports_success() {
    let collection = InMemoryCollection::new("tasks");
    let (view_model, mut effects) = loaded_view_model(&collection).await;

    view_model
        .dispatch_and_wait_for(
            TasksAction::DeleteTask {
                task_id: "missing".to_string(),
            },
            refreshed,
            WAIT,
        )
        .await
        .unwrap();

    assert_eq!(snackbar(&mut effects).await, TASK_DELETED);
}

#[tokio::test]
async fn update_task_end_to_end() {
    let collection = InMemoryCollection::new("tasks");
    let (id, fields) = seeded("t1", "Buy milk");
    collection.seed(id, fields);
    let (view_model, mut effects) = loaded_view_model(&collection).await;

    let task = view_model.state_with(|s| s.tasks[0].clone()).await;
    view_model
        .dispatch(TasksAction::SetTaskToBeUpdated { task })
        .await
        .unwrap();
    view_model
        .dispatch(TasksAction::OnChangeUpdateTaskDialogState { show: true })
        .await
        .unwrap();
    view_model
        .dispatch(TasksAction::OnChangeTaskTitle {
            text: "Buy oat milk".to_string(),
        })
        .await
        .unwrap();
    view_model
        .dispatch(TasksAction::OnChangeTaskBody { text: "1L".to_string() })
        .await
        .unwrap();

    collection.set_latency(Duration::from_millis(30));
    view_model.dispatch(TasksAction::UpdateTask).await.unwrap();
    assert!(view_model.state_with(|s| s.is_loading).await);

    // Settles after the update's own result and the refresh it triggers
    let mut changes = view_model.state_changes();
    while !view_model
        .state_with(|s| !s.is_loading && s.tasks[0].title == "Buy oat milk")
        .await
    {
        tokio::time::timeout(WAIT, changes.changed()).await.unwrap().unwrap();
    }

    assert_eq!(snackbar(&mut effects).await, TASK_UPDATED);
    let state = view_model.state().await;
    assert!(!state.show_update_task_dialog);
    assert!(state.task_title.is_empty());
    assert_eq!(state.tasks[0].title, "Buy oat milk");
    assert_eq!(state.tasks[0].body, "1L");
    assert_eq!(state.tasks[0].created_at, "Wednesday January 2025, 8:00AM");
}

#[tokio::test]
async fn update_without_selection_makes_no_call() {
    let collection = InMemoryCollection::new("tasks");
    let (view_model, mut effects) = loaded_view_model(&collection).await;
    collection.fail_with(Some(CollectionError::Unavailable("must not be called".to_string())));

    view_model.dispatch(TasksAction::UpdateTask).await.unwrap();
    assert!(!view_model.state_with(|s| s.is_loading).await);
    assert_eq!(snackbar(&mut effects).await, NO_TASK_SELECTED);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn shutdown_waits_for_running_calls() {
    let collection = InMemoryCollection::new("tasks");
    let (view_model, _effects) = loaded_view_model(&collection).await;
    collection.set_latency(Duration::from_millis(50));

    view_model.dispatch(TasksAction::GetTasks).await.unwrap();
    view_model.shutdown(WAIT).await.unwrap();

    assert!(matches!(
        view_model.dispatch(TasksAction::GetTasks).await,
        Err(StoreError::ShutdownInProgress)
    ));
}
