//! Configuration management for the task list.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::collection::{
    DEFAULT_BASE_URL, DEFAULT_DATABASE, DocumentCollection, FirestoreCollection, InMemoryCollection,
};
use crate::repository::{CollectionTaskRepository, DEFAULT_TIMEOUT, TaskRepository};
use std::sync::Arc;
use std::time::Duration;
use tasklist_core::environment::Clock;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `TASKLIST_BACKEND` names no known backend
    #[error("Unknown backend {0:?} (expected \"memory\" or \"firestore\")")]
    UnknownBackend(String),

    /// Firestore selected without a project
    #[error("FIRESTORE_PROJECT_ID is required for the firestore backend")]
    MissingProjectId,

    /// Timeout not a positive whole number of seconds
    #[error("Invalid TASKLIST_TIMEOUT_SECS {0:?} (expected a positive number of seconds)")]
    InvalidTimeout(String),

    /// Collection name blank
    #[error("TASKLIST_COLLECTION must not be empty")]
    EmptyCollection,
}

/// Firestore connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    /// Google Cloud project id
    pub project_id: String,
    /// Database id, `(default)` unless set
    pub database: String,
    /// REST root, overridable for the emulator
    pub base_url: String,
    /// Optional API key sent as `key=`
    pub api_key: Option<String>,
    /// Optional OAuth bearer token
    pub access_token: Option<String>,
}

impl std::fmt::Debug for FirestoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreConfig")
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Where tasks are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Process-local collection, lost on exit
    Memory,
    /// Cloud Firestore
    Firestore(FirestoreConfig),
}

/// Task list configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TasklistConfig {
    /// Storage backend
    pub backend: Backend,
    /// Collection holding the tasks
    pub collection: String,
    /// Bound on every repository call
    pub request_timeout: Duration,
}

impl Default for TasklistConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            collection: "tasks".to_string(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TasklistConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value or a
    /// required one is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// See [`TasklistConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let collection = lookup("TASKLIST_COLLECTION").unwrap_or_else(|| "tasks".to_string());
        if collection.trim().is_empty() {
            return Err(ConfigError::EmptyCollection);
        }

        let request_timeout = match lookup("TASKLIST_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
        };

        let backend = match lookup("TASKLIST_BACKEND").as_deref().map(str::trim) {
            None | Some("memory") => Backend::Memory,
            Some("firestore") => Backend::Firestore(FirestoreConfig {
                project_id: lookup("FIRESTORE_PROJECT_ID")
                    .filter(|id| !id.trim().is_empty())
                    .ok_or(ConfigError::MissingProjectId)?,
                database: lookup("FIRESTORE_DATABASE")
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                base_url: lookup("FIRESTORE_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                api_key: lookup("FIRESTORE_API_KEY"),
                access_token: lookup("FIRESTORE_ACCESS_TOKEN"),
            }),
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            backend,
            collection,
            request_timeout,
        })
    }

    /// Build the configured collection
    #[must_use]
    pub fn collection(&self) -> Arc<dyn DocumentCollection> {
        match &self.backend {
            Backend::Memory => Arc::new(InMemoryCollection::new(self.collection.clone())),
            Backend::Firestore(firestore) => {
                let mut collection =
                    FirestoreCollection::new(firestore.project_id.clone(), self.collection.clone())
                        .with_base_url(firestore.base_url.clone())
                        .with_database(firestore.database.clone());
                if let Some(key) = &firestore.api_key {
                    collection = collection.with_api_key(key.clone());
                }
                if let Some(token) = &firestore.access_token {
                    collection = collection.with_access_token(token.clone());
                }
                Arc::new(collection)
            },
        }
    }

    /// Build a repository over the configured collection
    #[must_use]
    pub fn repository(&self, clock: Arc<dyn Clock>) -> Arc<dyn TaskRepository> {
        tracing::info!(
            backend = match self.backend {
                Backend::Memory => "memory",
                Backend::Firestore(_) => "firestore",
            },
            collection = %self.collection,
            timeout_secs = self.request_timeout.as_secs(),
            "Building task repository"
        );
        let repository = CollectionTaskRepository::new(self.collection(), clock)
            .with_timeout(self.request_timeout);
        Arc::new(repository)
    }
}
