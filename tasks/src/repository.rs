//! Task repository over a document collection.
//!
//! The repository is the only place that talks to the collection. Every call
//! runs on its own task bounded by a timeout (10 seconds by default). A call
//! that overruns is abandoned rather than aborted: it keeps running on its
//! task, and the caller gets [`RepositoryError::Timeout`].

use crate::collection::{
    CollectionError, Document, DocumentCollection, FIELD_BODY, FIELD_CREATED_AT, FIELD_TITLE,
    Fields,
};
use crate::date;
use crate::error::{Operation, RepositoryError, Result};
use crate::types::Task;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tasklist_core::environment::Clock;

/// Bound applied to every collection call unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Boxed future returned by repository operations
pub type RepositoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Persistence contract for tasks
///
/// Implementations never panic or hang past their timeout; every failure is
/// an `Err`.
pub trait TaskRepository: Send + Sync {
    /// Persist a new task created now
    fn add_task(&self, title: String, body: String) -> RepositoryFuture<'_, ()>;

    /// Every stored task, `created_at` in display format
    fn get_all_tasks(&self) -> RepositoryFuture<'_, Vec<Task>>;

    /// Delete a task; an unknown id is not an error
    fn delete_task(&self, task_id: String) -> RepositoryFuture<'_, ()>;

    /// Replace title and body of a task, leaving its creation time
    fn update_task(
        &self,
        title: String,
        body: String,
        task_id: String,
    ) -> RepositoryFuture<'_, ()>;
}

/// [`TaskRepository`] backed by a [`DocumentCollection`]
#[derive(Clone)]
pub struct CollectionTaskRepository {
    collection: Arc<dyn DocumentCollection>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl CollectionTaskRepository {
    /// Create a repository with the default timeout
    #[must_use]
    pub fn new(collection: Arc<dyn DocumentCollection>, clock: Arc<dyn Clock>) -> Self {
        Self {
            collection,
            clock,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-call timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-call timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a collection call on its own task, bounded by the timeout
    async fn bounded<T, F>(&self, operation: Operation, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, CollectionError>> + Send + 'static,
        T: Send + 'static,
    {
        metrics::counter!("tasks.repository.calls", "operation" => operation.as_str()).increment(1);
        let start = std::time::Instant::now();

        // Dropping the handle on timeout detaches the task instead of cancelling it
        let outcome = match tokio::time::timeout(self.timeout, tokio::spawn(call)).await {
            Err(_) => Err(RepositoryError::Timeout {
                operation,
                timeout: self.timeout,
            }),
            Ok(Err(join_error)) => Err(RepositoryError::Store {
                operation,
                message: format!("{operation} task failed: {join_error}"),
            }),
            Ok(Ok(result)) => result.map_err(|error| RepositoryError::Store {
                operation,
                message: error.to_string(),
            }),
        };

        metrics::histogram!("tasks.repository.duration_seconds", "operation" => operation.as_str())
            .record(start.elapsed().as_secs_f64());

        if let Err(error) = &outcome {
            metrics::counter!(
                "tasks.repository.failures",
                "operation" => operation.as_str(),
                "kind" => error.kind()
            )
            .increment(1);
            tracing::warn!(%operation, kind = error.kind(), %error, "Repository call failed");
        }

        outcome
    }
}

/// Map a stored document to a task, skipping records that cannot be shown
fn task_from_document(document: Document) -> Option<Task> {
    if document.id.is_empty() {
        tracing::warn!("Skipping document without an id");
        return None;
    }

    let stored_at = document.field(FIELD_CREATED_AT).unwrap_or_default();
    let created_at = match date::to_display(stored_at) {
        Ok(display) => display,
        Err(error) => {
            tracing::warn!(
                task_id = %document.id,
                %error,
                "Skipping task with malformed createdAt"
            );
            return None;
        },
    };

    Some(Task {
        title: document.field(FIELD_TITLE).unwrap_or_default().to_string(),
        body: document.field(FIELD_BODY).unwrap_or_default().to_string(),
        task_id: document.id,
        created_at,
    })
}

impl TaskRepository for CollectionTaskRepository {
    fn add_task(&self, title: String, body: String) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            let fields = Fields::from([
                (FIELD_TITLE.to_string(), title),
                (FIELD_BODY.to_string(), body),
                (FIELD_CREATED_AT.to_string(), date::storage_now(self.clock.as_ref())),
            ]);

            let collection = Arc::clone(&self.collection);
            let id = self
                .bounded(Operation::AddTask, async move { collection.insert(fields).await })
                .await?;
            tracing::debug!(task_id = %id, "Task added");
            Ok(())
        })
    }

    fn get_all_tasks(&self) -> RepositoryFuture<'_, Vec<Task>> {
        Box::pin(async move {
            let collection = Arc::clone(&self.collection);
            let documents = self
                .bounded(Operation::GetAllTasks, async move { collection.list().await })
                .await?;

            let total = documents.len();
            let tasks: Vec<Task> = documents.into_iter().filter_map(task_from_document).collect();
            tracing::debug!(loaded = tasks.len(), skipped = total - tasks.len(), "Tasks loaded");
            Ok(tasks)
        })
    }

    fn delete_task(&self, task_id: String) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            let collection = Arc::clone(&self.collection);
            self.bounded(Operation::DeleteTask, {
                let task_id = task_id.clone();
                async move { collection.delete(task_id).await }
            })
            .await?;
            tracing::debug!(%task_id, "Task deleted");
            Ok(())
        })
    }

    fn update_task(
        &self,
        title: String,
        body: String,
        task_id: String,
    ) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            let fields = Fields::from([
                (FIELD_TITLE.to_string(), title),
                (FIELD_BODY.to_string(), body),
            ]);

            let collection = Arc::clone(&self.collection);
            self.bounded(Operation::UpdateTask, {
                let task_id = task_id.clone();
                async move { collection.update(task_id, fields).await }
            })
            .await?;
            tracing::debug!(%task_id, "Task updated");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(id: &str, pairs: &[(&str, &str)]) -> Document {
        Document {
            id: id.to_string(),
            fields: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn maps_document_and_formats_created_at() {
        let task = task_from_document(document(
            "abc",
            &[("title", "Buy milk"), ("body", "2%"), ("createdAt", "2025-01-01 15:04:05")],
        ))
        .unwrap();

        assert_eq!(
            task,
            Task {
                task_id: "abc".to_string(),
                title: "Buy milk".to_string(),
                body: "2%".to_string(),
                created_at: "Wednesday January 2025, 3:04PM".to_string(),
            }
        );
    }

    #[test]
    fn missing_title_and_body_default_to_empty() {
        let task =
            task_from_document(document("abc", &[("createdAt", "2025-01-01 15:04:05")])).unwrap();
        assert_eq!(task.title, "");
        assert_eq!(task.body, "");
    }

    #[test]
    fn malformed_or_missing_timestamp_is_skipped() {
        assert!(task_from_document(document("a", &[("createdAt", "yesterday")])).is_none());
        assert!(task_from_document(document("b", &[("title", "no timestamp")])).is_none());
    }

    #[test]
    fn document_without_id_is_skipped() {
        let document = document("", &[("createdAt", "2025-01-01 15:04:05")]);
        assert!(task_from_document(document).is_none());
    }
}
