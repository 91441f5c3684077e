//! Document collection abstraction the task repository persists into.
//!
//! A collection stores flat string-field documents under server-generated ids.
//! It is deliberately small: insert, list, delete and partial update are all
//! the repository needs.
//!
//! # Implementations
//!
//! - [`FirestoreCollection`]: Cloud Firestore over its REST API
//! - [`InMemoryCollection`]: process-local, with fault injection for tests and demos
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` so the repository can hold an
//! `Arc<dyn DocumentCollection>` and move calls onto their own tasks.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

mod firestore;
mod memory;

pub use firestore::{DEFAULT_BASE_URL, DEFAULT_DATABASE, FirestoreCollection};
pub use memory::InMemoryCollection;

/// Field holding a task's title
pub const FIELD_TITLE: &str = "title";
/// Field holding a task's body
pub const FIELD_BODY: &str = "body";
/// Field holding a task's creation time in storage format
pub const FIELD_CREATED_AT: &str = "createdAt";

/// Document fields by name
pub type Fields = BTreeMap<String, String>;

/// Boxed future returned by collection operations
pub type CollectionFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, CollectionError>> + Send + 'a>>;

/// A stored document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Server-generated id
    pub id: String,
    /// String fields; non-string values are not represented
    pub fields: Fields,
}

impl Document {
    /// Value of a field, if present
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Errors reported by a document collection
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectionError {
    /// No document with this id
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Credentials missing or rejected
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The request never produced a response (connection, TLS, DNS)
    #[error("Request failed: {0}")]
    Request(String),

    /// The response could not be decoded
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The backend answered with an error status
    #[error("Backend error (status {status}): {message}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// Error body
        message: String,
    },

    /// The backend is temporarily unable to serve requests (HTTP 503)
    #[error("{0}")]
    Unavailable(String),

    /// The id cannot name a single document (empty or containing `/`)
    #[error("Invalid document id: {0:?}")]
    InvalidId(String),
}

/// A collection of documents with server-generated ids
pub trait DocumentCollection: Send + Sync {
    /// Collection name
    fn name(&self) -> &str;

    /// Insert a document and return its generated id
    fn insert(&self, fields: Fields) -> CollectionFuture<'_, String>;

    /// Every document in the collection, ordered by id
    fn list(&self) -> CollectionFuture<'_, Vec<Document>>;

    /// Delete a document; deleting a missing id succeeds
    fn delete(&self, id: String) -> CollectionFuture<'_, ()>;

    /// Overwrite the given fields of an existing document, leaving the others
    ///
    /// Fails with [`CollectionError::NotFound`] if the document does not exist.
    fn update(&self, id: String, fields: Fields) -> CollectionFuture<'_, ()>;
}
