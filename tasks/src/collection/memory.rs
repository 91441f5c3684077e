//! In-process document collection.

use super::{CollectionError, CollectionFuture, Document, DocumentCollection, Fields};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Faults {
    latency: Duration,
    failure: Option<CollectionError>,
}

/// In-memory collection for demos and deterministic tests
///
/// Ids are simple-format v4 UUIDs. Clones share the same documents, so a test
/// can keep a handle for inspection while the repository owns another.
///
/// Faults can be injected: a fixed latency before every operation (to
/// exercise timeouts) and a failure returned by every operation.
///
/// # Example
///
/// ```
/// use tasklist::collection::{DocumentCollection, Fields, InMemoryCollection};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let collection = InMemoryCollection::new("tasks");
/// let id = collection
///     .insert(Fields::from([("title".to_string(), "Buy milk".to_string())]))
///     .await?;
///
/// let documents = collection.list().await?;
/// assert_eq!(documents[0].id, id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryCollection {
    name: String,
    documents: Arc<Mutex<BTreeMap<String, Fields>>>,
    faults: Arc<Mutex<Faults>>,
}

impl InMemoryCollection {
    /// Create an empty collection
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Arc::new(Mutex::new(BTreeMap::new())),
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    /// Store a document under a chosen id, bypassing faults
    pub fn seed(&self, id: impl Into<String>, fields: Fields) {
        self.documents().insert(id.into(), fields);
    }

    /// Fields of a document, bypassing faults
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Fields> {
        self.documents().get(id).cloned()
    }

    /// Number of stored documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents().len()
    }

    /// Whether the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents().is_empty()
    }

    /// Delay every subsequent operation by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.faults().latency = latency;
    }

    /// Make every subsequent operation fail with `failure` (`None` heals)
    pub fn fail_with(&self, failure: Option<CollectionError>) {
        self.faults().failure = failure;
    }

    fn documents(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Fields>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply injected latency, then any injected failure
    async fn gate(&self) -> Result<(), CollectionError> {
        let latency = self.faults().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.faults().failure.clone().map_or(Ok(()), Err)
    }
}

impl DocumentCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self, fields: Fields) -> CollectionFuture<'_, String> {
        Box::pin(async move {
            self.gate().await?;
            let id = Uuid::new_v4().simple().to_string();
            self.documents().insert(id.clone(), fields);
            Ok(id)
        })
    }

    fn list(&self) -> CollectionFuture<'_, Vec<Document>> {
        Box::pin(async move {
            self.gate().await?;
            Ok(self
                .documents()
                .iter()
                .map(|(id, fields)| Document {
                    id: id.clone(),
                    fields: fields.clone(),
                })
                .collect())
        })
    }

    fn delete(&self, id: String) -> CollectionFuture<'_, ()> {
        Box::pin(async move {
            self.gate().await?;
            self.documents().remove(&id);
            Ok(())
        })
    }

    fn update(&self, id: String, fields: Fields) -> CollectionFuture<'_, ()> {
        Box::pin(async move {
            self.gate().await?;
            let mut documents = self.documents();
            let existing = documents
                .get_mut(&id)
                .ok_or_else(|| CollectionError::NotFound(id.clone()))?;
            existing.extend(fields);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn insert_generates_distinct_ids() {
        let collection = InMemoryCollection::new("tasks");
        let a = collection.insert(fields(&[("title", "a")])).await.unwrap();
        let b = collection.insert(fields(&[("title", "b")])).await.unwrap();

        assert!(!a.is_empty());
        assert_ne!(a, b);
        assert_eq!(collection.len(), 2);
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let collection = InMemoryCollection::new("tasks");
        collection.seed("t1", fields(&[("title", "old"), ("createdAt", "2025-01-01 00:00:00")]));

        collection
            .update("t1".to_string(), fields(&[("title", "new")]))
            .await
            .unwrap();

        let stored = collection.get("t1").unwrap();
        assert_eq!(stored["title"], "new");
        assert_eq!(stored["createdAt"], "2025-01-01 00:00:00");
    }

    #[tokio::test]
    async fn update_missing_document_fails() {
        let collection = InMemoryCollection::new("tasks");
        let error = collection
            .update("nope".to_string(), fields(&[("title", "x")]))
            .await
            .unwrap_err();
        assert_eq!(error, CollectionError::NotFound("nope".to_string()));
    }

    #[tokio::test]
    async fn delete_missing_document_succeeds() {
        let collection = InMemoryCollection::new("tasks");
        assert!(collection.delete("nope".to_string()).await.is_ok());
    }

    #[tokio::test]
    async fn injected_failure_and_heal() {
        let collection = InMemoryCollection::new("tasks");
        collection.fail_with(Some(CollectionError::Unavailable("offline".to_string())));
        assert!(collection.list().await.is_err());
        assert!(collection.insert(Fields::new()).await.is_err());
        assert!(collection.is_empty());

        collection.fail_with(None);
        assert!(collection.list().await.unwrap().is_empty());
    }
}
