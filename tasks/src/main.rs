//! Task list demo binary
//!
//! Drives the task screen through add, list, update and delete against the
//! configured backend (in-memory unless `TASKLIST_BACKEND=firestore`).

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tasklist::{TasklistConfig, TasksAction, TasksEnvironment, TasksState, TasksViewModel, UiEffect};
use tasklist_core::environment::SystemClock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const STEP_TIMEOUT: Duration = Duration::from_secs(30);

/// A list refresh, or a failure that ends the step without one
fn settled(action: &TasksAction) -> bool {
    matches!(
        action,
        TasksAction::TasksLoaded { .. }
            | TasksAction::TaskAdded { result: Err(_) }
            | TasksAction::TaskUpdated { result: Err(_) }
            | TasksAction::TaskDeleted { result: Err(_) }
    )
}

fn print_tasks(state: &TasksState) {
    if state.tasks.is_empty() {
        println!("  (no tasks)");
    }
    for task in &state.tasks {
        println!("  [{}] {} - {} ({})", task.task_id, task.title, task.body, task.created_at);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklist=debug,tasklist_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Task List ===\n");

    let config = TasklistConfig::from_env().context("Invalid configuration")?;
    let env = TasksEnvironment::new(config.repository(Arc::new(SystemClock)));

    // Subscribe before construction so the initial load's messages are seen
    let mut effects = env.side_effects.subscribe();
    tokio::spawn(async move {
        while let Some(UiEffect::ShowSnackbar { message }) = effects.recv().await {
            println!("  >> {message}");
        }
    });

    let mut view_model = TasksViewModel::with_environment(env).await?;
    view_model
        .wait_until_loaded(STEP_TIMEOUT)
        .await
        .context("Initial load did not finish")?;
    println!("Loaded:");
    print_tasks(&view_model.state().await);

    println!("\n>>> Adding a task");
    view_model
        .dispatch(TasksAction::OnChangeAddTaskDialogState { show: true })
        .await?;
    view_model
        .dispatch(TasksAction::OnChangeTaskTitle {
            text: "Buy milk".to_string(),
        })
        .await?;
    view_model
        .dispatch(TasksAction::OnChangeTaskBody { text: "2%".to_string() })
        .await?;
    let (title, body) = view_model
        .state_with(|s| (s.task_title.clone(), s.task_body.clone()))
        .await;
    view_model
        .dispatch_and_wait_for(TasksAction::AddTask { title, body }, settled, STEP_TIMEOUT)
        .await?;
    print_tasks(&view_model.state().await);

    let added = view_model
        .state_with(|s| s.tasks.iter().find(|task| task.title == "Buy milk").cloned())
        .await;
    let Some(task) = added else {
        println!("\nNothing was added, stopping here");
        view_model.shutdown(STEP_TIMEOUT).await?;
        return Ok(());
    };

    println!("\n>>> Updating {}", task.task_id);
    view_model
        .dispatch(TasksAction::SetTaskToBeUpdated { task: task.clone() })
        .await?;
    view_model
        .dispatch(TasksAction::OnChangeUpdateTaskDialogState { show: true })
        .await?;
    view_model
        .dispatch(TasksAction::OnChangeTaskTitle {
            text: "Buy oat milk".to_string(),
        })
        .await?;
    view_model
        .dispatch(TasksAction::OnChangeTaskBody { text: task.body.clone() })
        .await?;
    view_model
        .dispatch_and_wait_for(TasksAction::UpdateTask, settled, STEP_TIMEOUT)
        .await?;
    print_tasks(&view_model.state().await);

    println!("\n>>> Deleting {}", task.task_id);
    view_model
        .dispatch_and_wait_for(
            TasksAction::DeleteTask {
                task_id: task.task_id.clone(),
            },
            settled,
            STEP_TIMEOUT,
        )
        .await?;
    print_tasks(&view_model.state().await);

    view_model.shutdown(STEP_TIMEOUT).await?;
    println!("\n=== Done ===");
    Ok(())
}
